pub mod args;
pub mod op;
pub mod ops;

pub use ops::{
    Account, Download, DownloadFolder, Init, Ls, Mkdir, PruneShares, Rm, Share, Shared, Unshare,
    Upload,
};
