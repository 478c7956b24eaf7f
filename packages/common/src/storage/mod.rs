mod error;
mod key;
mod traits;

pub mod filesystem;
#[cfg(feature = "object-storage")]
pub mod s3;

pub use error::StorageError;
pub use key::{BlobKey, MAX_FILE_NAME_LEN, song_file_name};
pub use traits::{BlobStore, public_url};
