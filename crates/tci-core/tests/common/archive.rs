//! Builds Tomcat-shaped release tarballs in memory.

use flate2::write::GzEncoder;
use flate2::Compression;

/// Gzipped tar with a top-level `apache-tomcat-{version}/` directory holding
/// `LICENSE`, `RELEASE-NOTES` and `bin/startup.sh`.
pub fn tomcat_tarball(version: &str) -> Vec<u8> {
    let top = format!("apache-tomcat-{version}");
    let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));

    let mut dir = tar::Header::new_gnu();
    dir.set_entry_type(tar::EntryType::Directory);
    dir.set_size(0);
    dir.set_mode(0o755);
    builder
        .append_data(&mut dir, format!("{top}/"), std::io::empty())
        .unwrap();

    let notes = format!("Apache Tomcat Version {version}\n");
    let files: [(&str, &[u8], u32); 3] = [
        ("LICENSE", b"Apache License\nVersion 2.0\n", 0o644),
        ("RELEASE-NOTES", notes.as_bytes(), 0o644),
        ("bin/startup.sh", b"#!/bin/sh\nexec ./catalina.sh start\n", 0o755),
    ];
    for (name, data, mode) in files {
        let mut header = tar::Header::new_gnu();
        header.set_entry_type(tar::EntryType::Regular);
        header.set_size(data.len() as u64);
        header.set_mode(mode);
        builder
            .append_data(&mut header, format!("{top}/{name}"), data)
            .unwrap();
    }
    builder.into_inner().unwrap().finish().unwrap()
}

/// Lowercase hex SHA-1, the form Apache publishes in `.sha1` manifests.
pub fn sha1_hex(data: &[u8]) -> String {
    use sha1::{Digest, Sha1};
    hex::encode(Sha1::digest(data))
}

/// `"<sha1>  apache-tomcat-{version}.tar.gz\n"`
pub fn manifest(data: &[u8], version: &str) -> String {
    format!("{}  apache-tomcat-{version}.tar.gz\n", sha1_hex(data))
}
