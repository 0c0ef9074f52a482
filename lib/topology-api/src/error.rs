use thiserror::Error;

/// Raised when an image selector does not name exactly one image source
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ImageSelectionError {
    #[error("image must set one of id, sharedGallery or marketplace, none were set")]
    NoneSet,

    #[error("image must set exactly one of id, sharedGallery or marketplace, found: {}", .0.join(", "))]
    MultipleSet(Vec<&'static str>),
}
