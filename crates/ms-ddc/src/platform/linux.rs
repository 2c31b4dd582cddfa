//! Linux distribution and kernel identity.

use super::{join_name_version, uname, KernelInfo};
use crate::error::{DdcError, Result};
use crate::fallback::Chain;
use log::warn;
use std::fs;
use std::io;
use std::path::Path;

/// Marker files of distributions that predate `os-release`, in lookup order.
const RELEASE_FILES: &[(&str, &str)] = &[
    ("etc/redhat-release", "redhat"),
    ("etc/centos-release", "centos"),
    ("etc/fedora-release", "fedora"),
    ("etc/debian_version", "debian"),
    ("etc/arch-release", "arch"),
    ("etc/gentoo-release", "gentoo"),
    ("etc/alpine-release", "alpine"),
    ("etc/slackware-version", "slackware"),
];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinuxInfo {
    /// e.g. "Ubuntu"
    pub name: String,
    /// e.g. "22.04.3 LTS (Jammy Jellyfish)"
    pub version: String,
    /// e.g. "ubuntu"
    pub id: String,
    pub version_id: String,
    pub pretty_name: String,
    pub codename: String,
    pub kernel: KernelInfo,
}

impl LinuxInfo {
    pub fn summary(&self) -> String {
        join_name_version(&self.name, &self.version)
    }
}

/// Kernel identity plus the first distribution source that yields anything.
///
/// `root` is prepended to every release file path (`/` on a live system).
pub fn detect_linux_info(root: &Path) -> Result<LinuxInfo> {
    let mut info = Chain::new("Linux distribution")
        .then("os-release", || {
            parse_os_release(&fs::read_to_string(root.join("etc/os-release"))?)
        })
        .then("lsb-release", || {
            parse_lsb_release(&fs::read_to_string(root.join("etc/lsb-release"))?)
        })
        .then("release files", || release_file_info(root))
        .run()?;

    match uname() {
        Ok(kernel) => info.kernel = kernel,
        Err(e) => warn!("Could not get kernel info: {}", e),
    }
    Ok(info)
}

/// `KEY=value` pairs with comments and blank lines skipped and surrounding
/// quotes removed.
fn key_values(content: &str) -> impl Iterator<Item = (&str, &str)> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(k, v)| (k.trim(), v.trim().trim_matches(|c: char| c == '"' || c == '\'')))
}

pub fn parse_os_release(content: &str) -> Result<LinuxInfo> {
    let mut info = LinuxInfo::default();
    let mut ubuntu_codename = String::new();
    for (key, value) in key_values(content) {
        let value = value.to_string();
        match key {
            "NAME" => info.name = value,
            "VERSION" => info.version = value,
            "ID" => info.id = value,
            "VERSION_ID" => info.version_id = value,
            "PRETTY_NAME" => info.pretty_name = value,
            "VERSION_CODENAME" => info.codename = value,
            "UBUNTU_CODENAME" => ubuntu_codename = value,
            _ => {}
        }
    }
    if info.codename.is_empty() {
        info.codename = ubuntu_codename;
    }

    if info.name.is_empty() && info.id.is_empty() && info.pretty_name.is_empty() {
        return Err(DdcError::parse("os-release", content));
    }
    Ok(info)
}

pub fn parse_lsb_release(content: &str) -> Result<LinuxInfo> {
    let mut info = LinuxInfo::default();
    for (key, value) in key_values(content) {
        match key {
            "DISTRIB_ID" => {
                info.id = value.to_lowercase();
                info.name = value.to_string();
            }
            "DISTRIB_RELEASE" => {
                info.version = value.to_string();
                info.version_id = value.to_string();
            }
            "DISTRIB_DESCRIPTION" => info.pretty_name = value.to_string(),
            "DISTRIB_CODENAME" => info.codename = value.to_string(),
            _ => {}
        }
    }

    if info.name.is_empty() && info.id.is_empty() {
        return Err(DdcError::parse("lsb-release", content));
    }
    Ok(info)
}

fn first_line(path: &Path) -> Result<String> {
    let content = fs::read_to_string(path)?;
    match content.lines().next().map(str::trim) {
        Some(line) if !line.is_empty() => Ok(line.to_string()),
        _ => Err(DdcError::parse(path.display().to_string(), &content)),
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// First readable, non-empty marker file from [`RELEASE_FILES`].
pub fn release_file_info(root: &Path) -> Result<LinuxInfo> {
    for (file, distro) in RELEASE_FILES {
        let Ok(line) = first_line(&root.join(file)) else {
            continue;
        };
        let version = extract_version(&line).unwrap_or_default().to_string();
        return Ok(LinuxInfo {
            name: capitalize(distro),
            id: distro.to_string(),
            pretty_name: line,
            version_id: version.clone(),
            version,
            ..LinuxInfo::default()
        });
    }
    Err(DdcError::Io(io::Error::new(
        io::ErrorKind::NotFound,
        "no distribution release files found",
    )))
}

/// First word that looks like a dotted version: starts with a digit,
/// contains a `.`, at least three characters.
pub fn extract_version(content: &str) -> Option<&str> {
    content.split_whitespace().find(|word| {
        word.len() >= 3 && word.contains('.') && word.starts_with(|c: char| c.is_ascii_digit())
    })
}
