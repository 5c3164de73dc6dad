pub mod account;
pub mod download;
pub mod download_folder;
pub mod init;
pub mod ls;
pub mod mkdir;
pub mod prune_shares;
pub mod rm;
pub mod share;
pub mod shared;
pub mod unshare;
pub mod upload;

pub use account::Account;
pub use download::Download;
pub use download_folder::DownloadFolder;
pub use init::Init;
pub use ls::Ls;
pub use mkdir::Mkdir;
pub use prune_shares::PruneShares;
pub use rm::Rm;
pub use share::Share;
pub use shared::Shared;
pub use unshare::Unshare;
pub use upload::Upload;
