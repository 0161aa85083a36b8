use std::collections::BTreeMap;
use std::io::Write;

use crate::codec::Tag;
use crate::error::Error;
use crate::tables::head::HeadTable;
use crate::tables::offset::{OffsetTable, SfntVersion, TableRecord};
use crate::tables::{checked_u16, checked_u32, pack_table, FontData, FontTable};
use crate::utils::align_write::AlignWrite;
use byteorder::{BigEndian, ByteOrder};

const CHECK_SUM_MAGIC: u32 = 0xB1B0AFBA;

/// Collects encoded tables and lays them out into a font file.
#[derive(Debug, Default)]
pub struct FontWriter {
    tables: BTreeMap<Tag, Vec<u8>>,
}

impl FontWriter {
    pub fn new() -> Self {
        FontWriter::default()
    }

    pub fn insert(&mut self, tag: Tag, data: Vec<u8>) {
        self.tables.insert(tag, data);
    }

    pub fn pack<'a, T: FontTable<'a>>(&mut self, table: &T, dep: T::PackDep) -> Result<(), Error> {
        let data = pack_table(table, dep)?;
        self.insert(T::TAG, data);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Writes the table directory followed by all tables in tag order. Every table starts at a
    /// 4-byte boundary. If there is a `head` table, its checkSumAdjustment is computed over the
    /// whole file.
    pub fn finish(mut self, sfnt_version: SfntVersion) -> Result<Vec<u8>, Error> {
        let num_tables = checked_u16(self.tables.len(), "tables")?;
        let directory_len = 12 + usize::from(num_tables) * 16;

        if let Some(head) = self.tables.get_mut(&HeadTable::TAG) {
            let adjustment = HeadTable::CHECK_SUM_ADJUSTMENT_OFFSET;
            match head.get_mut(adjustment..adjustment + 4) {
                Some(bytes) => bytes.fill(0),
                None => return Err(Error::malformed("head", "table is too short")),
            }
        }

        let mut records = BTreeMap::new();
        let mut offset = directory_len;
        for (tag, data) in &self.tables {
            records.insert(
                *tag,
                TableRecord {
                    tag: *tag,
                    check_sum: check_sum(data),
                    offset: checked_u32(offset, "bytes of font data")?,
                    length: checked_u32(data.len(), "bytes per table")?,
                },
            );
            offset += padded_len(data.len());
        }

        let offset_table = OffsetTable::new(sfnt_version, records);
        let mut wr = AlignWrite::new(Vec::with_capacity(offset), 4);
        offset_table.pack(&mut wr, ())?;
        for data in self.tables.values() {
            wr.write_all(data)?;
            wr.pad()?;
        }
        let mut font = wr.into_inner();

        if let Some(record) = offset_table.get_table_record(HeadTable::TAG) {
            let pos = record.offset as usize + HeadTable::CHECK_SUM_ADJUSTMENT_OFFSET;
            let adjustment = CHECK_SUM_MAGIC.wrapping_sub(check_sum(&font));
            BigEndian::write_u32(&mut font[pos..pos + 4], adjustment);
        }

        Ok(font)
    }
}

fn padded_len(len: usize) -> usize {
    (len + 3) & !3
}

/// Sum of the big-endian u32 words of `data`, which is treated as if padded with zeros to a
/// multiple of 4.
pub fn check_sum(data: &[u8]) -> u32 {
    data.chunks(4).fold(0u32, |sum, chunk| {
        let mut word = [0; 4];
        word[..chunk.len()].copy_from_slice(chunk);
        sum.wrapping_add(u32::from_be_bytes(word))
    })
}
