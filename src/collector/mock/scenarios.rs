//! Pre-built mock filesystem scenarios for testing.

use super::filesystem::MockFs;

impl MockFs {
    /// Data directory `/data` with two subdirectories and one loose file.
    ///
    /// - `/data/logs`: one file of 100 bytes
    /// - `/data/cache`: two files of 50 and 150 bytes, one nested
    /// - `/data/readme.txt`: plain file, never part of a snapshot
    pub fn data_dir() -> Self {
        let fs = Self::new();
        fs.add_file("/data/logs/app.log", 100);
        fs.add_file("/data/cache/a.bin", 50);
        fs.add_file("/data/cache/nested/b.bin", 150);
        fs.add_file("/data/readme.txt", 7);
        fs
    }

    /// Deeper tree with empty directories and symlinks mixed in.
    pub fn mixed_tree() -> Self {
        let fs = Self::new();
        fs.add_file("/srv/media/video/2024/a.mp4", 1_000_000);
        fs.add_file("/srv/media/video/2025/b.mp4", 2_500_000);
        fs.add_file("/srv/media/audio/c.flac", 300_000);
        fs.add_symlink("/srv/media/latest");
        fs.add_dir("/srv/media/video/empty");
        fs.add_dir("/srv/empty");
        fs.add_file("/srv/db/wal/000001", 16 * 1024 * 1024);
        fs.add_file("/srv/db/base/1/1259", 8192);
        fs.add_symlink("/srv/current");
        fs
    }
}
