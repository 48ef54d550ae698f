//! Content sniffing over a bounded file prefix.
//!
//! The classifier only needs a MIME type and a description for the first
//! few kilobytes of a file. [`ContentSniffer`] is that capability;
//! [`SignatureSniffer`] implements it with a table of magic signatures and
//! a text heuristic, which covers what a package store mostly holds (ELF
//! objects, scripts, compressed payloads, text).

use compact_str::CompactString;

/// MIME type and description for a content prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sniffed {
    /// MIME type, e.g. `application/x-executable`.
    pub mime_type: CompactString,
    /// Free-text description, e.g. `ELF 64-bit LSB executable, x86-64`.
    pub description: String,
}

impl Sniffed {
    /// Create a new sniff result.
    pub fn new(mime_type: impl Into<CompactString>, description: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            description: description.into(),
        }
    }
}

/// Content-based type detection.
pub trait ContentSniffer: Send + Sync {
    /// Classify a file from (at most) its first bytes.
    fn sniff(&self, prefix: &[u8]) -> Sniffed;
}

/// A magic signature at a fixed offset.
struct Signature {
    offset: usize,
    magic: &'static [u8],
    mime_type: &'static str,
    description: &'static str,
}

const fn sig(
    offset: usize,
    magic: &'static [u8],
    mime_type: &'static str,
    description: &'static str,
) -> Signature {
    Signature {
        offset,
        magic,
        mime_type,
        description,
    }
}

/// Checked in order; offset signatures first so a bzImage's MZ stub or a
/// tar member's content does not shadow them.
const SIGNATURES: &[Signature] = &[
    sig(514, b"HdrS", "application/octet-stream", "Linux kernel x86 boot executable bzImage"),
    sig(257, b"ustar", "application/x-tar", "POSIX tar archive"),
    sig(0, b"\x0d\0\0\0\0\0\0\0nix-archive-1", "application/x-nix-nar", "Nix archive"),
    sig(0, b"\x1f\x8b", "application/gzip", "gzip compressed data"),
    sig(0, b"\xfd7zXZ\0", "application/x-xz", "XZ compressed data"),
    sig(0, b"BZh", "application/x-bzip2", "bzip2 compressed data"),
    sig(0, b"\x28\xb5\x2f\xfd", "application/zstd", "Zstandard compressed data"),
    sig(0, b"PK\x03\x04", "application/zip", "Zip archive data"),
    sig(0, b"7z\xbc\xaf\x27\x1c", "application/x-7z-compressed", "7-zip archive data"),
    sig(0, b"\x89PNG\r\n\x1a\n", "image/png", "PNG image data"),
    sig(0, b"\xff\xd8\xff", "image/jpeg", "JPEG image data"),
    sig(0, b"GIF87a", "image/gif", "GIF image data, version 87a"),
    sig(0, b"GIF89a", "image/gif", "GIF image data, version 89a"),
    sig(0, b"%PDF-", "application/pdf", "PDF document"),
    sig(0, b"\0asm", "application/wasm", "WebAssembly (wasm) binary module"),
    sig(0, b"SQLite format 3\0", "application/vnd.sqlite3", "SQLite 3.x database"),
    sig(0, b"\xcf\xfa\xed\xfe", "application/x-mach-binary", "Mach-O 64-bit executable"),
    sig(0, b"\xce\xfa\xed\xfe", "application/x-mach-binary", "Mach-O executable"),
];

/// Signature-table sniffer.
#[derive(Debug, Default, Clone, Copy)]
pub struct SignatureSniffer;

impl SignatureSniffer {
    /// Create a new signature sniffer.
    pub fn new() -> Self {
        Self
    }
}

impl ContentSniffer for SignatureSniffer {
    fn sniff(&self, prefix: &[u8]) -> Sniffed {
        if prefix.is_empty() {
            return Sniffed::new("application/x-empty", "empty");
        }

        if prefix.starts_with(b"\x7fELF") {
            return sniff_elf(prefix);
        }

        if let Some(signature) = SIGNATURES.iter().find(|s| matches_at(prefix, s.offset, s.magic)) {
            return Sniffed::new(signature.mime_type, signature.description);
        }

        match text_encoding(prefix) {
            Some(encoding) if prefix.starts_with(b"#!") => sniff_script(prefix, encoding),
            Some(encoding) => Sniffed::new("text/plain", encoding.description()),
            None => Sniffed::new("application/octet-stream", "data"),
        }
    }
}

fn matches_at(prefix: &[u8], offset: usize, magic: &[u8]) -> bool {
    prefix
        .get(offset..offset + magic.len())
        .is_some_and(|window| window == magic)
}

fn sniff_elf(prefix: &[u8]) -> Sniffed {
    let bits = match prefix.get(4) {
        Some(1) => "32-bit",
        Some(2) => "64-bit",
        _ => return Sniffed::new("application/octet-stream", "ELF, invalid class"),
    };
    let little_endian = match prefix.get(5) {
        Some(1) => true,
        Some(2) => false,
        _ => return Sniffed::new("application/octet-stream", format!("ELF {bits}, invalid byte order")),
    };
    let order = if little_endian { "LSB" } else { "MSB" };

    let half = |at: usize| -> Option<u16> {
        let bytes = [*prefix.get(at)?, *prefix.get(at + 1)?];
        Some(if little_endian {
            u16::from_le_bytes(bytes)
        } else {
            u16::from_be_bytes(bytes)
        })
    };

    let (mime_type, object) = match half(16) {
        Some(1) => ("application/x-object", "relocatable"),
        Some(2) => ("application/x-executable", "executable"),
        Some(3) => ("application/x-sharedlib", "shared object"),
        Some(4) => ("application/x-coredump", "core file"),
        _ => ("application/octet-stream", "unknown type"),
    };

    let mut description = format!("ELF {bits} {order} {object}");
    if let Some(machine) = half(18).and_then(elf_machine) {
        description.push_str(", ");
        description.push_str(machine);
    }
    Sniffed::new(mime_type, description)
}

fn elf_machine(machine: u16) -> Option<&'static str> {
    Some(match machine {
        0x03 => "Intel 80386",
        0x08 => "MIPS",
        0x14 => "PowerPC",
        0x15 => "64-bit PowerPC",
        0x28 => "ARM",
        0x3e => "x86-64",
        0xb7 => "ARM aarch64",
        0xf3 => "RISC-V",
        _ => return None,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TextEncoding {
    Ascii,
    Utf8,
}

impl TextEncoding {
    fn description(self) -> &'static str {
        match self {
            Self::Ascii => "ASCII text",
            Self::Utf8 => "Unicode text, UTF-8 text",
        }
    }
}

/// Decide whether a prefix looks like text.
///
/// A multibyte sequence cut off by the end of the prefix still counts as
/// UTF-8, since the prefix is an arbitrary window into the file.
fn text_encoding(prefix: &[u8]) -> Option<TextEncoding> {
    let valid = match std::str::from_utf8(prefix) {
        Ok(_) => prefix.len(),
        Err(err) if err.error_len().is_none() => err.valid_up_to(),
        Err(_) => return None,
    };

    let printable = prefix[..valid]
        .iter()
        .all(|&b| b >= 0x20 || matches!(b, b'\t' | b'\n' | b'\r' | 0x0c | 0x1b));
    if !printable || prefix[..valid].contains(&0x7f) {
        return None;
    }

    if prefix.is_ascii() {
        Some(TextEncoding::Ascii)
    } else {
        Some(TextEncoding::Utf8)
    }
}

fn sniff_script(prefix: &[u8], encoding: TextEncoding) -> Sniffed {
    let line_end = prefix.iter().position(|&b| b == b'\n').unwrap_or(prefix.len());
    let line = String::from_utf8_lossy(&prefix[2..line_end]);
    let mut words = line.split_whitespace();

    let mut interpreter = words
        .next()
        .map(|cmd| cmd.rsplit('/').next().unwrap_or(cmd))
        .unwrap_or_default();
    if interpreter == "env" {
        interpreter = words.find(|w| !w.starts_with('-')).unwrap_or_default();
    }

    let (mime_type, kind) = match interpreter.trim_end_matches(|c: char| c.is_ascii_digit() || c == '.') {
        "sh" | "dash" | "ash" => ("text/x-shellscript", "POSIX shell script".to_string()),
        "bash" => ("text/x-shellscript", "Bourne-Again shell script".to_string()),
        "zsh" => ("text/x-shellscript", "Paul Falstad's zsh script".to_string()),
        "python" => ("text/x-script.python", "Python script".to_string()),
        "perl" => ("text/x-perl", "Perl script text".to_string()),
        "" => ("text/plain", "script".to_string()),
        other => ("text/plain", format!("a {other} script")),
    };

    Sniffed::new(
        mime_type,
        format!("{kind}, {} executable", encoding.description()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sniff(bytes: &[u8]) -> Sniffed {
        SignatureSniffer.sniff(bytes)
    }

    fn elf_header(class: u8, data: u8, e_type: u16, machine: u16) -> Vec<u8> {
        let mut header = vec![0u8; 64];
        header[..4].copy_from_slice(b"\x7fELF");
        header[4] = class;
        header[5] = data;
        header[6] = 1;
        if data == 1 {
            header[16..18].copy_from_slice(&e_type.to_le_bytes());
            header[18..20].copy_from_slice(&machine.to_le_bytes());
        } else {
            header[16..18].copy_from_slice(&e_type.to_be_bytes());
            header[18..20].copy_from_slice(&machine.to_be_bytes());
        }
        header
    }

    #[test]
    fn test_empty() {
        let result = sniff(b"");
        assert_eq!(result.mime_type, "application/x-empty");
        assert_eq!(result.description, "empty");
    }

    #[test]
    fn test_ascii_text() {
        let result = sniff(b"hello");
        assert_eq!(result.mime_type, "text/plain");
        assert_eq!(result.description, "ASCII text");
    }

    #[test]
    fn test_utf8_text_truncated_at_boundary() {
        // "é" is 0xc3 0xa9; the prefix ends after the first byte.
        let result = sniff(b"caf\xc3");
        assert_eq!(result.mime_type, "text/plain");
        assert_eq!(result.description, "Unicode text, UTF-8 text");
    }

    #[test]
    fn test_binary_data() {
        let result = sniff(&[0x00, 0x01, 0x02, 0xff]);
        assert_eq!(result.mime_type, "application/octet-stream");
        assert_eq!(result.description, "data");
    }

    #[test]
    fn test_elf_shared_object() {
        let result = sniff(&elf_header(2, 1, 3, 0x3e));
        assert_eq!(result.mime_type, "application/x-sharedlib");
        assert_eq!(result.description, "ELF 64-bit LSB shared object, x86-64");
    }

    #[test]
    fn test_elf_big_endian_executable() {
        let result = sniff(&elf_header(1, 2, 2, 0x14));
        assert_eq!(result.mime_type, "application/x-executable");
        assert_eq!(result.description, "ELF 32-bit MSB executable, PowerPC");
    }

    #[test]
    fn test_truncated_elf_still_elf() {
        let result = sniff(b"\x7fELF\x02\x01");
        assert!(result.description.starts_with("ELF 64-bit LSB"));
    }

    #[test]
    fn test_shebang_env_python() {
        let result = sniff(b"#!/usr/bin/env python3\nprint('hi')\n");
        assert_eq!(result.mime_type, "text/x-script.python");
        assert_eq!(result.description, "Python script, ASCII text executable");
    }

    #[test]
    fn test_shebang_store_bash() {
        let result = sniff(b"#!/nix/store/abc-bash-5.2/bin/bash -e\necho hi\n");
        assert_eq!(result.mime_type, "text/x-shellscript");
        assert_eq!(result.description, "Bourne-Again shell script, ASCII text executable");
    }

    #[test]
    fn test_gzip_and_nar() {
        assert_eq!(sniff(b"\x1f\x8b\x08\x00").mime_type, "application/gzip");

        let mut nar = b"\x0d\0\0\0\0\0\0\0nix-archive-1\0\0\0".to_vec();
        nar.extend_from_slice(&[0u8; 16]);
        assert_eq!(sniff(&nar).description, "Nix archive");
    }

    #[test]
    fn test_tar_at_offset() {
        let mut tar = vec![0u8; 512];
        tar[..8].copy_from_slice(b"file.txt");
        tar[257..262].copy_from_slice(b"ustar");
        assert_eq!(sniff(&tar).mime_type, "application/x-tar");
    }

    #[test]
    fn test_kernel_image() {
        let mut kernel = vec![0u8; 1024];
        kernel[..2].copy_from_slice(b"MZ");
        kernel[514..518].copy_from_slice(b"HdrS");
        assert!(sniff(&kernel).description.contains("Linux kernel"));
    }
}
