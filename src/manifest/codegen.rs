//! Generated manifest source for self-contained deployables.
//!
//! Emits Rust source text: deduplicated `include_bytes!` declarations, one
//! per distinct underlying byte-source path, followed by a literal
//! `Manifest::from_entries` collection whose records reference those
//! declarations through `ByteSource::eager`. The whole emission is a fragment
//! stream consumed once by the writer.

use std::collections::HashMap;
use std::io::{self, Write};

use super::record::{AssetRecord, ByteSource, Manifest};
use super::text::Frag;

const HEADER: &str = "\
// Generated by staticd. Do not edit.
use staticd::manifest::{AssetRecord, ByteSource, CompressionPair, Manifest, Validators};
";

/// Dedup table for byte-source declarations.
///
/// Each distinct path is assigned one compact base-36 identifier the first
/// time it is seen; every later reference reuses it. Two declarations for one
/// path are impossible by construction.
#[derive(Default)]
struct SourceTable {
    declared: HashMap<String, String>,
    declarations: Vec<Frag>,
}

impl SourceTable {
    fn reference(&mut self, path: &str) -> String {
        if let Some(id) = self.declared.get(path) {
            return id.clone();
        }
        let id = format!("F_{}", to_base36(self.declared.len()).to_uppercase());
        self.declarations.push(Frag::concat(vec![
            Frag::lit("static "),
            Frag::owned(id.clone()),
            Frag::lit(": &[u8] = include_bytes!("),
            Frag::quoted(path),
            Frag::lit(");"),
        ]));
        self.declared.insert(path.to_string(), id.clone());
        id
    }
}

/// Emit the manifest as Rust source text.
///
/// Entries are written in sorted pathname order; record order carries no
/// meaning at serve time. Only lazily-resolved manifests (the builder's
/// output) can be emitted: an embedded source has no path to declare.
pub fn emit_manifest_source<W: Write>(manifest: &Manifest, writer: &mut W) -> io::Result<()> {
    let mut table = SourceTable::default();
    let mut sorted: Vec<(&str, &AssetRecord)> = manifest.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));

    let mut entries = Vec::with_capacity(sorted.len());
    for (pathname, record) in sorted {
        entries.push(entry_frag(&mut table, pathname, record)?);
    }

    Frag::concat(vec![
        Frag::lit(HEADER),
        Frag::lit("\n"),
        Frag::join(table.declarations, "\n"),
        Frag::lit("\n\n#[must_use]\npub fn assets() -> Manifest {\n  "),
        Frag::concat(vec![
            Frag::lit("Manifest::from_entries([\n  "),
            Frag::join(entries, ",\n").indent(),
            Frag::lit(",\n])"),
        ])
        .indent(),
        Frag::lit("\n}\n"),
    ])
    .write_to(writer)
}

fn entry_frag(
    table: &mut SourceTable,
    pathname: &str,
    record: &AssetRecord,
) -> io::Result<Frag> {
    let record_frag = struct_lit(
        "AssetRecord",
        vec![
            field("source", eager_expr(table, &record.source)?),
            field(
                "immutable",
                Frag::lit(if record.immutable { "true" } else { "false" }),
            ),
            field(
                "validators",
                struct_lit(
                    "Validators",
                    vec![
                        field(
                            "last_modified",
                            into_string(&record.validators.last_modified),
                        ),
                        field("etag", into_string(&record.validators.etag)),
                        field("size", Frag::owned(record.validators.size.to_string())),
                    ],
                ),
            ),
            field("content_type", into_string(&record.content_type)),
            field(
                "compression",
                struct_lit(
                    "CompressionPair",
                    vec![
                        field(
                            "brotli",
                            option_expr(table, record.compression.brotli.as_ref())?,
                        ),
                        field(
                            "gzip",
                            option_expr(table, record.compression.gzip.as_ref())?,
                        ),
                    ],
                ),
            ),
        ],
    );

    Ok(Frag::concat(vec![
        Frag::lit("(\n  "),
        Frag::concat(vec![Frag::quoted(pathname), Frag::lit(",\n"), record_frag]).indent(),
        Frag::lit(",\n)"),
    ]))
}

/// `ByteSource::eager(F_<n>)`, declaring the underlying path on first use.
fn eager_expr(table: &mut SourceTable, source: &ByteSource) -> io::Result<Frag> {
    match source {
        ByteSource::Lazy(rel) => {
            let id = table.reference(&rel.to_string_lossy().replace('\\', "/"));
            Ok(Frag::owned(format!("ByteSource::eager({id})")))
        }
        ByteSource::Eager(_) => Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "embedded byte sources cannot be re-emitted as source text",
        )),
    }
}

fn option_expr(table: &mut SourceTable, source: Option<&ByteSource>) -> io::Result<Frag> {
    match source {
        Some(src) => Ok(Frag::concat(vec![
            Frag::lit("Some("),
            eager_expr(table, src)?,
            Frag::lit(")"),
        ])),
        None => Ok(Frag::lit("None")),
    }
}

fn field(name: &'static str, value: Frag) -> Frag {
    Frag::concat(vec![Frag::lit(name), Frag::lit(": "), value])
}

fn struct_lit(name: &'static str, fields: Vec<Frag>) -> Frag {
    Frag::concat(vec![
        Frag::lit(name),
        Frag::lit(" {\n  "),
        Frag::join(fields, ",\n").indent(),
        Frag::lit(",\n}"),
    ])
}

fn into_string(value: &str) -> Frag {
    Frag::concat(vec![Frag::quoted(value), Frag::lit(".into()")])
}

fn to_base36(mut n: usize) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[n % 36]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}
