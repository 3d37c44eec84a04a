use morph_cloud::config::GestureSource;
use morph_cloud::input::{
    parse_frame_line, synthetic_frame, FeedOptions, FrameLine, GestureEvent, HandPose,
    LandmarkFeed,
};
use std::path::PathBuf;
use std::time::{Duration, Instant};

fn frame_text(fingers: u8, with_z: bool) -> String {
    let hand = HandPose::with_fingers(fingers, (0.4, 0.6)).landmarks();
    hand.0
        .iter()
        .map(|p| {
            if with_z {
                format!("{},{},{}", p.x, p.y, p.z)
            } else {
                format!("{},{}", p.x, p.y)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn opts(source: GestureSource, file: Option<PathBuf>) -> FeedOptions {
    FeedOptions {
        source,
        file,
        fps: 240,
        looping: false,
    }
}

#[test]
fn parses_two_and_three_coordinate_frames() {
    let Ok(FrameLine::Hand(flat)) = parse_frame_line(&frame_text(3, false), 1) else {
        panic!("expected a hand");
    };
    assert_eq!(flat.finger_count(), 3);
    assert!(flat.0.iter().all(|p| p.z == 0.0));

    let Ok(FrameLine::Hand(deep)) = parse_frame_line(&format!("  {}  ", frame_text(5, true)), 2)
    else {
        panic!("expected a hand");
    };
    assert_eq!(deep.finger_count(), 5);
    assert!(deep.0.iter().any(|p| p.z != 0.0));
}

#[test]
fn blank_dash_and_comment_lines() {
    assert_eq!(parse_frame_line("", 1), Ok(FrameLine::NoHand));
    assert_eq!(parse_frame_line("   -  ", 1), Ok(FrameLine::NoHand));
    assert_eq!(parse_frame_line("# recorded at 30fps", 1), Ok(FrameLine::Skip));
}

#[test]
fn malformed_frames_report_their_line() {
    let err = parse_frame_line("0.1,0.2 0.3,0.4", 7).unwrap_err();
    assert_eq!(err.line, 7);
    assert!(err.to_string().starts_with("landmark parse error at line 7:"));
    assert!(err.message.contains("expected 21 landmarks, got 2"));

    let mut tokens = vec!["0.5,0.5"; 21];
    tokens[4] = "nan,0.5";
    assert!(parse_frame_line(&tokens.join(" "), 3).is_err());

    tokens[4] = "0.5,0.5,0,1";
    let err = parse_frame_line(&tokens.join(" "), 3).unwrap_err();
    assert!(err.message.contains("landmark 4"));

    tokens[4] = "0.5,abc";
    assert!(parse_frame_line(&tokens.join(" "), 3).is_err());
}

#[test]
fn synthetic_detector_counts_up_then_drops_the_hand() {
    let fingers = |t: f32| synthetic_frame(t).map(|h| h.finger_count());
    assert_eq!(fingers(0.5), Some(0));
    assert_eq!(fingers(4.5), Some(1));
    assert_eq!(fingers(8.5), Some(2));
    assert_eq!(fingers(12.5), Some(3));
    assert_eq!(fingers(16.5), Some(4));
    assert_eq!(fingers(20.5), Some(5));
    assert_eq!(fingers(24.5), None);
    assert_eq!(fingers(25.5 + 4.5), Some(1));
}

#[test]
fn no_source_starts_no_feed() {
    assert!(LandmarkFeed::start(&opts(GestureSource::None, None))
        .unwrap()
        .is_none());
}

#[test]
fn file_source_needs_a_readable_path() {
    assert!(LandmarkFeed::start(&opts(GestureSource::File, None)).is_err());
    let missing = std::env::temp_dir().join("morph-cloud-missing-landmarks.txt");
    let _ = std::fs::remove_file(&missing);
    assert!(LandmarkFeed::start(&opts(GestureSource::File, Some(missing))).is_err());
}

#[test]
fn file_replay_delivers_frames_in_order() {
    let path = std::env::temp_dir().join(format!(
        "morph-cloud-landmarks-{}.txt",
        std::process::id()
    ));
    let text = format!("{}\n-\n# pause\nnot a frame\n", frame_text(2, false));
    std::fs::write(&path, text).unwrap();

    let mut feed = LandmarkFeed::start(&opts(GestureSource::File, Some(path.clone())))
        .unwrap()
        .expect("file feed");
    assert_eq!(feed.label(), "file");

    let deadline = Instant::now() + Duration::from_secs(2);
    let mut events = Vec::new();
    while events.len() < 3 && Instant::now() < deadline {
        match feed.poll() {
            Some(ev) => events.push(ev),
            None => std::thread::sleep(Duration::from_millis(2)),
        }
    }
    drop(feed);
    let _ = std::fs::remove_file(&path);

    assert_eq!(events.len(), 3, "events: {events:?}");
    match &events[0] {
        GestureEvent::Frame(Some(hand)) => assert_eq!(hand.finger_count(), 2),
        other => panic!("unexpected first event {other:?}"),
    }
    assert_eq!(events[1], GestureEvent::Frame(None));
    match &events[2] {
        GestureEvent::Fault(msg) => assert!(msg.contains("line 4"), "{msg}"),
        other => panic!("unexpected third event {other:?}"),
    }
}

#[test]
fn synthetic_feed_produces_frames() {
    let mut feed = LandmarkFeed::start(&opts(GestureSource::Synthetic, None))
        .unwrap()
        .expect("synthetic feed");
    assert_eq!(feed.label(), "synthetic");
    let deadline = Instant::now() + Duration::from_secs(2);
    let mut got = None;
    while got.is_none() && Instant::now() < deadline {
        got = feed.poll();
        if got.is_none() {
            std::thread::sleep(Duration::from_millis(2));
        }
    }
    assert!(matches!(got, Some(GestureEvent::Frame(Some(_)))));
}

#[test]
fn comment_only_recording_ends_the_replay() {
    let path = std::env::temp_dir().join(format!(
        "morph-cloud-comments-{}.txt",
        std::process::id()
    ));
    std::fs::write(&path, "# only a comment\n# another\n").unwrap();

    let mut looping = opts(GestureSource::File, Some(path.clone()));
    looping.looping = true;
    looping.fps = 30;
    let mut feed = LandmarkFeed::start(&looping).unwrap().expect("file feed");

    let deadline = Instant::now() + Duration::from_secs(2);
    while !feed.is_finished() && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(5));
    }
    let _ = std::fs::remove_file(&path);

    assert!(feed.is_finished(), "replay thread kept running");
    assert!(feed.poll().is_none());
    feed.stop().expect("clean stop");
}

#[test]
fn custom_feed_reports_a_panicked_producer() {
    let feed = LandmarkFeed::custom("broken", |_prod, _stop| panic!("detector crashed"))
        .expect("spawn");
    let deadline = Instant::now() + Duration::from_secs(2);
    while !feed.is_finished() && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(2));
    }
    let err = feed.stop().unwrap_err();
    assert!(err.to_string().contains("broken"), "{err}");
}

#[test]
fn custom_feed_delivers_pushed_events() {
    use ringbuf::traits::Producer as _;
    let mut feed = LandmarkFeed::custom("scripted", |prod, _stop| {
        let _ = prod.try_push(GestureEvent::Frame(None));
    })
    .expect("spawn");
    assert_eq!(feed.label(), "scripted");

    let deadline = Instant::now() + Duration::from_secs(2);
    let mut got = None;
    while got.is_none() && Instant::now() < deadline {
        got = feed.poll();
        std::thread::sleep(Duration::from_millis(1));
    }
    assert_eq!(got, Some(GestureEvent::Frame(None)));
    feed.stop().expect("clean stop");
}
