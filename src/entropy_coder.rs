pub mod bit_reader;
pub mod bit_writer;
pub mod sample_adaptive;

pub use bit_reader::BitReader;
pub use bit_writer::BitWriter;
pub use sample_adaptive::{SampleAdaptiveDecoder, SampleAdaptiveEncoder};
