pub mod codec;
pub mod quota;

pub use codec::{ByteStream, HttpPreviewCodec, PreviewCodec, UnavailableCodec};
pub use quota::QuotaService;
