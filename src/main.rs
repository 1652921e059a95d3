mod args;
mod camshift;
mod capture;
mod detect;
mod geometry;
mod logging;
mod overlay;
mod selection;
mod target;
mod tracker;
mod ui;

use std::collections::VecDeque;
use std::time::Instant;

use log::error;
use log::info;

use crate::capture::FrameSource;
use crate::detect::FaceDetector;
use crate::overlay::BlendWeights;
use crate::overlay::OverlaySprite;
use crate::tracker::ObjectTracker;

const WINDOW_NAME: &'static str = "camtrack-rs";
const FPS_GROUP_SIZE: usize = 20;
const BALLOON_TEXTS: [&'static str; 3] = [
    "What am I gonna do?",
    "Mark an object with the mouse!",
    "Tracking...",
];

fn main() {
    let args = args::parse_args();

    logging::setup_logging();

    let source = match &args.file {
        Some(path) => FrameSource::open_still(path.as_str()),
        None => FrameSource::open_camera(args.camera),
    };
    let Ok(mut source) = source else {
        error!("Could not open frame source");
        return;
    };

    let Ok(mut detector) = FaceDetector::from_file(args.cascade.as_str(), args.detect_every)
    else {
        error!("Could not load cascade {}", args.cascade);
        return;
    };

    let Ok(sprite) = OverlaySprite::load(args.overlay.as_str()) else {
        error!("Could not load overlay {}", args.overlay);
        return;
    };

    let weights = if args.opacity < 1.0 {
        BlendWeights::translucent(args.opacity)
    } else {
        BlendWeights::OVERWRITE
    };

    let Ok(mut tracker) = ObjectTracker::new(sprite, weights) else {
        error!("Could not create tracker");
        return;
    };

    if ui::create_window(WINDOW_NAME).is_err() {
        error!("Could not create window");
        return;
    }

    let events = selection::new_event_queue();
    if ui::install_mouse_handler(WINDOW_NAME, events.clone()).is_err() {
        error!("Could not install mouse handler");
        return;
    }

    let mut texts: VecDeque<String> = BALLOON_TEXTS.iter().map(|text| text.to_string()).collect();
    let mut fps = ui::FpsMeter::new(FPS_GROUP_SIZE);

    loop {
        let mut frame = match source.next_frame() {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                info!("frame source exhausted");
                break;
            }
            Err(err) => {
                error!("frame capture failed: {err}");
                break;
            }
        };

        let started = Instant::now();

        for event in events.lock().unwrap().drain(..) {
            tracker.handle_mouse_event(event);
        }

        // anything that goes wrong inside a single frame is transient:
        // drop the tracking state and move on to the next frame
        if let Err(err) = process_frame(&mut frame, &mut detector, &mut tracker, &texts, &args) {
            error!("frame processing failed: {err}");
            if tracker.reset().is_err() {
                error!("tracker reset failed");
                break;
            }
            continue;
        }

        match ui::show_frame(WINDOW_NAME, &frame) {
            Ok(true) => break,
            Ok(false) => {}
            Err(err) => {
                error!("display failed: {err}");
                break;
            }
        }

        if let Some(average) = fps.tick(started.elapsed()) {
            info!("{average:.4} fps");
            texts.rotate_left(1);
        }
    }
}

fn process_frame(
    frame: &mut opencv::core::Mat,
    detector: &mut FaceDetector,
    tracker: &mut ObjectTracker,
    texts: &VecDeque<String>,
    args: &args::Args,
) -> opencv::Result<()> {
    let faces = detector.detect(frame)?;
    tracker.track_object(frame)?;
    if args.face_boxes {
        ui::draw_face_boxes(frame, &faces)?;
    }
    ui::write_text(frame, texts, &faces)?;
    Ok(())
}
