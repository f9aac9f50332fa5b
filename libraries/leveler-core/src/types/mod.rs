mod audio;
mod record;

pub use audio::{AudioBuffer, AudioFormat, SampleEncoding, SampleRate};
pub use record::{DecodedRecord, MeasuredRecord, Measurement, NormalizedRecord};
