//! Supported browser drivers and their release conventions.

use std::fmt;

use crate::platform::{Arch, OsFamily, Platform};

/// A browser-automation driver that can be resolved and installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DriverKind {
    /// Chrome's driver
    ChromeDriver,
    /// Firefox's driver
    GeckoDriver,
}

impl DriverKind {
    /// Binary name without extension.
    pub const fn name(self) -> &'static str {
        match self {
            Self::ChromeDriver => "chromedriver",
            Self::GeckoDriver => "geckodriver",
        }
    }

    /// Browser name as written in compatibility statements.
    pub const fn browser(self) -> &'static str {
        match self {
            Self::ChromeDriver => "Chrome",
            Self::GeckoDriver => "Firefox",
        }
    }

    /// Page listing releases and the browser versions they support.
    pub const fn default_compatibility_url(self) -> &'static str {
        match self {
            Self::ChromeDriver => "https://chromedriver.chromium.org/downloads",
            Self::GeckoDriver => {
                "https://firefox-source-docs.mozilla.org/testing/geckodriver/Support.html"
            }
        }
    }

    /// Executable file name on `os`.
    pub fn binary_name(self, os: OsFamily) -> String {
        match os {
            OsFamily::Windows => format!("{}.exe", self.name()),
            _ => self.name().to_string(),
        }
    }

    /// Filename patterns of release archives built for `platform`.
    ///
    /// Empty when no official build exists; configuration can add patterns.
    pub const fn default_asset_patterns(self, platform: Platform) -> &'static [&'static str] {
        match (self, platform.os, platform.arch) {
            (Self::ChromeDriver, OsFamily::Windows, Arch::X86 | Arch::X86_64) => {
                &[r"^chromedriver_win32\.zip$"]
            }
            (Self::ChromeDriver, OsFamily::MacOs, Arch::X86_64) => &[r"^chromedriver_mac64\.zip$"],
            (Self::ChromeDriver, OsFamily::MacOs, Arch::Aarch64) => {
                &[r"^chromedriver_mac_arm64\.zip$", r"^chromedriver_mac64_m1\.zip$"]
            }
            (Self::ChromeDriver, OsFamily::Linux, Arch::X86_64) => {
                &[r"^chromedriver_linux64\.zip$"]
            }
            (Self::GeckoDriver, OsFamily::Windows, Arch::X86_64) => {
                &[r"^geckodriver-v[\d.]+-win64\.zip$"]
            }
            (Self::GeckoDriver, OsFamily::Windows, Arch::X86) => {
                &[r"^geckodriver-v[\d.]+-win32\.zip$"]
            }
            (Self::GeckoDriver, OsFamily::Windows, Arch::Aarch64) => {
                &[r"^geckodriver-v[\d.]+-win-aarch64\.zip$"]
            }
            (Self::GeckoDriver, OsFamily::MacOs, Arch::X86_64) => {
                &[r"^geckodriver-v[\d.]+-macos\.tar\.gz$"]
            }
            (Self::GeckoDriver, OsFamily::MacOs, Arch::Aarch64) => {
                &[r"^geckodriver-v[\d.]+-macos-aarch64\.tar\.gz$"]
            }
            (Self::GeckoDriver, OsFamily::Linux, Arch::X86_64) => {
                &[r"^geckodriver-v[\d.]+-linux64\.tar\.gz$"]
            }
            (Self::GeckoDriver, OsFamily::Linux, Arch::X86) => {
                &[r"^geckodriver-v[\d.]+-linux32\.tar\.gz$"]
            }
            (Self::GeckoDriver, OsFamily::Linux, Arch::Aarch64) => {
                &[r"^geckodriver-v[\d.]+-linux-aarch64\.tar\.gz$"]
            }
            _ => &[],
        }
    }
}

impl fmt::Display for DriverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
