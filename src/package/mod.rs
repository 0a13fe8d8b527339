pub mod packager;

pub use packager::{ArchivePackager, NativeTarGz, PackageReport, TarCommand};
