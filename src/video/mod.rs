mod audio;
mod captions;
mod cookies;
mod resolver;

pub use audio::AudioTranscriber;
pub use captions::{parse_timed_text, select_track, CaptionResolver, SelectedTrack};
pub use cookies::CookieJar;
pub use resolver::{VideoOptions, VideoResolver, YtDlpResolver};
