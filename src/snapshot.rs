//! Gzip-compressed tar snapshots of a ranked set.
//!
//! The archive holds up to two entries: [`BITMAP_ENTRY`] with the bitmap's
//! native serialization, and [`ITEMS_ENTRY`] with the id-ordered item records,
//! written only when at least one score is recorded.

use flate2::{read::GzDecoder, write::GzEncoder, Compression};
use std::io::{self, Read, Write};
use tracing::{debug, trace, warn};

use crate::{
    bitmap::Membership,
    error::{Error, Result},
    item::ItemList,
};

pub const BITMAP_ENTRY: &str = "rbm";
pub const ITEMS_ENTRY: &str = "lst";

/// Knobs for writing snapshots.
#[derive(Clone, Copy, Debug)]
pub struct SnapshotOptions {
    pub level: Compression,
}

impl Default for SnapshotOptions {
    fn default() -> Self {
        Self {
            level: Compression::fast(),
        }
    }
}

impl SnapshotOptions {
    pub fn with_level(level: Compression) -> Self {
        Self { level }
    }
}

fn append_entry<W: Write>(tar: &mut tar::Builder<W>, name: &str, bytes: &[u8]) -> Result<()> {
    let mut header = tar::Header::new_gnu();
    header.set_size(bytes.len() as u64);
    header.set_mode(0o644);
    tar.append_data(&mut header, name, bytes)?;
    trace!(entry = name, bytes = bytes.len(), "appended snapshot entry");
    Ok(())
}

pub(crate) fn write<B, W>(bitmap: &B, items: &mut ItemList, w: W, opts: &SnapshotOptions) -> Result<()>
where
    B: Membership,
    W: Write,
{
    let gz = GzEncoder::new(w, opts.level);
    let mut tar = tar::Builder::new(gz);

    let mut buf = Vec::new();
    bitmap.serialize_into(&mut buf)?;
    append_entry(&mut tar, BITMAP_ENTRY, &buf)?;
    let bitmap_bytes = buf.len();

    if !items.is_empty() {
        buf.clear();
        items.encode(&mut buf)?;
        append_entry(&mut tar, ITEMS_ENTRY, &buf)?;
    }

    let gz = tar.into_inner()?;
    gz.finish()?;
    debug!(
        members = bitmap.cardinality(),
        scored = items.len(),
        bitmap_bytes,
        "wrote snapshot"
    );
    Ok(())
}

pub(crate) fn read<B, R>(r: R) -> Result<(B, ItemList)>
where
    B: Membership,
    R: Read,
{
    let mut bitmap = B::default();
    let mut items = ItemList::new();
    let mut archive = tar::Archive::new(GzDecoder::new(r));
    for entry in archive.entries()? {
        let mut entry = entry?;
        let name = entry.path()?.to_string_lossy().into_owned();
        match name.as_str() {
            BITMAP_ENTRY => {
                bitmap = B::deserialize_from(&mut entry).map_err(Error::Bitmap)?;
            }
            ITEMS_ENTRY => {
                items = ItemList::decode(&mut entry)?;
            }
            _ => {
                warn!(entry = %name, "ignoring unknown snapshot entry");
                continue;
            }
        }
        trace!(entry = %name, "loaded snapshot entry");
    }
    // tar stops at its end blocks; the gzip trailer is only checked at eof
    io::copy(&mut archive.into_inner(), &mut io::sink())?;
    debug!(
        members = bitmap.cardinality(),
        scored = items.len(),
        "read snapshot"
    );
    Ok((bitmap, items))
}
