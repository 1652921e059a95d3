use clap::Parser;

#[derive(Clone, Parser)]
#[clap(
    name = "camtrack-rs",
    about = "CamShift Object Tracker",
    version,
    author
)]
pub struct Args {
    /// Haar cascade file
    #[clap(
        short = 'c',
        long = "cascade",
        default_value = "cascades/haarcascade_frontalface_alt.xml"
    )]
    pub cascade: String,

    /// Track inside this image file instead of the webcam
    #[clap(short = 'f', long = "file")]
    pub file: Option<String>,

    /// Webcam index
    #[clap(long = "camera", default_value = "0")]
    pub camera: i32,

    /// Overlay image pasted onto the tracked object
    #[clap(short = 'o', long = "overlay", default_value = "images/overlay.png")]
    pub overlay: String,

    /// Run the face cascade only every Nth frame
    #[clap(long = "detect-every", default_value = "5")]
    pub detect_every: u32,

    /// Overlay opacity between 0.0 and 1.0
    #[clap(long = "opacity", default_value = "1.0")]
    pub opacity: f32,

    /// Draw a rectangle around each detected face
    #[clap(long = "face-boxes")]
    pub face_boxes: bool,
}

pub fn parse_args() -> Args {
    Args::parse()
}
