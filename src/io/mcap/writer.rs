// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Chunked MCAP writer with a full summary section.
//!
//! Messages are buffered per chunk, compressed with zstd once the buffer
//! reaches the target chunk size, and followed by one MessageIndex record per
//! channel. [`McapWriter::finish`] writes the data end record, the summary
//! section (schemas, channels, statistics, chunk indexes), summary offsets and
//! the footer, so readers can seek without scanning the data section.
//!
//! The record layout follows the MCAP specification at
//! <https://github.com/foxglove/mcap/tree/main/docs/specification> and is
//! readable by the `mcap` crate.

use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use byteorder::{LittleEndian, WriteBytesExt};
use tracing::debug;

use super::constants::{
    COMPRESSION_ZSTD, MCAP_MAGIC, OP_CHANNEL, OP_CHUNK, OP_CHUNK_INDEX, OP_DATA_END, OP_FOOTER,
    OP_HEADER, OP_MESSAGE, OP_MESSAGE_INDEX, OP_SCHEMA, OP_STATISTICS, OP_SUMMARY_OFFSET,
    PROFILE_ROS2,
};
use crate::core::{ConvertError, Result};

const CONTEXT: &str = "McapWriter";

/// Output buffer in front of the file.
const FILE_BUFFER_CAPACITY: usize = 1024 * 1024;

/// Chunking and compression settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriterOptions {
    /// zstd compression level.
    pub compression_level: i32,
    /// Uncompressed bytes buffered before a chunk is emitted.
    pub chunk_size: usize,
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self {
            compression_level: crate::config::DEFAULT_COMPRESSION_LEVEL,
            chunk_size: crate::config::DEFAULT_CHUNK_SIZE,
        }
    }
}

/// Totals reported by [`McapWriter::finish`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriterSummary {
    pub messages: u64,
    pub chunks: u64,
    pub channels: usize,
    pub schemas: usize,
    /// Total file size in bytes.
    pub bytes: u64,
}

/// Chunk index entry kept for the summary section.
#[derive(Debug, Clone)]
struct ChunkIndexRecord {
    message_start_time: u64,
    message_end_time: u64,
    chunk_start_offset: u64,
    chunk_length: u64,
    message_index_offsets: BTreeMap<u16, u64>,
    message_index_length: u64,
    compressed_size: u64,
    uncompressed_size: u64,
}

#[derive(Debug, Clone)]
struct SchemaRecord {
    id: u16,
    name: String,
    encoding: String,
    data: Vec<u8>,
}

#[derive(Debug, Clone)]
struct ChannelRecord {
    id: u16,
    schema_id: u16,
    topic: String,
    message_encoding: String,
    metadata: BTreeMap<String, String>,
}

/// Summary offset entry: opcode, start and length of one summary group.
type SummaryGroup = (u8, u64, u64);

/// MCAP writer owning its chunk buffer.
///
/// Schema ids start at 1 (0 means "no schema"), channel ids at 0. Both are
/// deduplicated by name and topic respectively.
pub struct McapWriter<W: Write> {
    writer: W,
    options: WriterOptions,
    /// Tracked by hand since `BufWriter` does not expose its position.
    position: u64,
    finished: bool,

    schema_ids: HashMap<String, u16>,
    channel_ids: HashMap<String, u16>,
    schema_records: Vec<SchemaRecord>,
    channel_records: Vec<ChannelRecord>,
    sequences: HashMap<u16, u32>,
    channel_message_counts: BTreeMap<u16, u64>,

    chunk_indexes: Vec<ChunkIndexRecord>,
    messages_written: u64,
    message_start_time: u64,
    message_end_time: u64,

    /// Serialized message records of the open chunk.
    chunk_buffer: Vec<u8>,
    chunk_start_time: u64,
    chunk_end_time: u64,
    /// Per-channel `(log_time, offset)` entries of the open chunk.
    chunk_index: BTreeMap<u16, Vec<(u64, u64)>>,
}

impl McapWriter<BufWriter<File>> {
    /// Create the file at `path` and write the leading magic and header.
    pub fn create<P: AsRef<Path>>(path: P, options: WriterOptions) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path)
            .map_err(|e| ConvertError::io(path, format!("Failed to create file: {e}")))?;
        Self::new(BufWriter::with_capacity(FILE_BUFFER_CAPACITY, file), options)
    }
}

impl<W: Write> McapWriter<W> {
    /// Wrap a sink and write the leading magic and header.
    pub fn new(writer: W, options: WriterOptions) -> Result<Self> {
        let mut mcap = Self {
            writer,
            options,
            position: 0,
            finished: false,
            schema_ids: HashMap::new(),
            channel_ids: HashMap::new(),
            schema_records: Vec::new(),
            channel_records: Vec::new(),
            sequences: HashMap::new(),
            channel_message_counts: BTreeMap::new(),
            chunk_indexes: Vec::new(),
            messages_written: 0,
            message_start_time: u64::MAX,
            message_end_time: 0,
            chunk_buffer: Vec::with_capacity(options.chunk_size),
            chunk_start_time: u64::MAX,
            chunk_end_time: 0,
            chunk_index: BTreeMap::new(),
        };
        mcap.write_header()?;
        Ok(mcap)
    }

    fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        self.writer.write_all(data)?;
        self.position += data.len() as u64;
        Ok(())
    }

    fn write_u8(&mut self, val: u8) -> Result<()> {
        self.write_bytes(&[val])
    }

    fn write_u16(&mut self, val: u16) -> Result<()> {
        self.write_bytes(&val.to_le_bytes())
    }

    fn write_u32(&mut self, val: u32) -> Result<()> {
        self.write_bytes(&val.to_le_bytes())
    }

    fn write_u64(&mut self, val: u64) -> Result<()> {
        self.write_bytes(&val.to_le_bytes())
    }

    fn write_string(&mut self, s: &str) -> Result<()> {
        self.write_u32(s.len() as u32)?;
        self.write_bytes(s.as_bytes())
    }

    fn ensure_open(&self) -> Result<()> {
        if self.finished {
            return Err(ConvertError::encode(CONTEXT, "writer already finished"));
        }
        Ok(())
    }

    /// Magic, then a Header record with the `ros2` profile and library name.
    fn write_header(&mut self) -> Result<()> {
        let library = concat!(env!("CARGO_PKG_NAME"), " ", env!("CARGO_PKG_VERSION"));
        self.write_bytes(&MCAP_MAGIC)?;
        self.write_u8(OP_HEADER)?;
        self.write_u64(4 + PROFILE_ROS2.len() as u64 + 4 + library.len() as u64)?;
        self.write_string(PROFILE_ROS2)?;
        self.write_string(library)
    }

    /// Add a schema, returning the existing id if `name` is already known.
    pub fn add_schema(&mut self, name: &str, encoding: &str, data: &[u8]) -> Result<u16> {
        self.ensure_open()?;
        if let Some(&id) = self.schema_ids.get(name) {
            return Ok(id);
        }
        let id = u16::try_from(self.schema_records.len() + 1)
            .map_err(|_| ConvertError::encode(CONTEXT, "too many schemas"))?;
        let record = SchemaRecord {
            id,
            name: name.to_string(),
            encoding: encoding.to_string(),
            data: data.to_vec(),
        };
        self.write_schema_record(&record)?;
        self.schema_records.push(record);
        self.schema_ids.insert(name.to_string(), id);
        Ok(id)
    }

    /// Add a channel, returning the existing id if `topic` is already known.
    pub fn add_channel(
        &mut self,
        schema_id: u16,
        topic: &str,
        message_encoding: &str,
        metadata: &BTreeMap<String, String>,
    ) -> Result<u16> {
        self.ensure_open()?;
        if let Some(&id) = self.channel_ids.get(topic) {
            return Ok(id);
        }
        let id = u16::try_from(self.channel_records.len())
            .map_err(|_| ConvertError::encode(CONTEXT, "too many channels"))?;
        let record = ChannelRecord {
            id,
            schema_id,
            topic: topic.to_string(),
            message_encoding: message_encoding.to_string(),
            metadata: metadata.clone(),
        };
        self.write_channel_record(&record)?;
        self.channel_records.push(record);
        self.channel_ids.insert(topic.to_string(), id);
        self.sequences.insert(id, 0);
        self.channel_message_counts.insert(id, 0);
        Ok(id)
    }

    /// Channel id of a topic, if added.
    pub fn channel_id(&self, topic: &str) -> Option<u16> {
        self.channel_ids.get(topic).copied()
    }

    /// Buffer one message; a chunk is emitted once the buffer is full.
    pub fn write_message(
        &mut self,
        channel_id: u16,
        log_time: u64,
        publish_time: u64,
        data: &[u8],
    ) -> Result<()> {
        self.ensure_open()?;
        let Some(sequence) = self.sequences.get_mut(&channel_id) else {
            return Err(ConvertError::encode(
                CONTEXT,
                format!("unknown channel id {channel_id}"),
            ));
        };
        let seq = *sequence;
        *sequence = seq.wrapping_add(1);
        *self.channel_message_counts.entry(channel_id).or_insert(0) += 1;

        self.message_start_time = self.message_start_time.min(log_time);
        self.message_end_time = self.message_end_time.max(log_time);
        self.chunk_start_time = self.chunk_start_time.min(log_time);
        self.chunk_end_time = self.chunk_end_time.max(log_time);

        let offset = self.chunk_buffer.len() as u64;
        self.chunk_index
            .entry(channel_id)
            .or_default()
            .push((log_time, offset));

        // opcode + length + channel_id + sequence + log_time + publish_time + data
        let buf = &mut self.chunk_buffer;
        buf.write_u8(OP_MESSAGE)?;
        buf.write_u64::<LittleEndian>(2 + 4 + 8 + 8 + data.len() as u64)?;
        buf.write_u16::<LittleEndian>(channel_id)?;
        buf.write_u32::<LittleEndian>(seq)?;
        buf.write_u64::<LittleEndian>(log_time)?;
        buf.write_u64::<LittleEndian>(publish_time)?;
        buf.extend_from_slice(data);
        self.messages_written += 1;

        if self.chunk_buffer.len() >= self.options.chunk_size {
            self.flush_chunk()?;
        }
        Ok(())
    }

    /// Compress the open chunk and write it with its message indexes.
    fn flush_chunk(&mut self) -> Result<()> {
        if self.chunk_buffer.is_empty() {
            return Ok(());
        }
        let uncompressed = std::mem::take(&mut self.chunk_buffer);
        let index = std::mem::take(&mut self.chunk_index);
        let start_time = std::mem::replace(&mut self.chunk_start_time, u64::MAX);
        let end_time = std::mem::replace(&mut self.chunk_end_time, 0);

        let crc = crc32fast::hash(&uncompressed);
        let compressed = zstd::bulk::compress(&uncompressed, self.options.compression_level)
            .map_err(|e| ConvertError::encode(CONTEXT, format!("Zstd compression failed: {e}")))?;

        let chunk_start_offset = self.position;
        self.write_u8(OP_CHUNK)?;
        let record_length =
            8 + 8 + 8 + 4 + 4 + COMPRESSION_ZSTD.len() as u64 + 8 + compressed.len() as u64;
        self.write_u64(record_length)?;
        self.write_u64(start_time)?;
        self.write_u64(end_time)?;
        self.write_u64(uncompressed.len() as u64)?;
        self.write_u32(crc)?;
        self.write_string(COMPRESSION_ZSTD)?;
        self.write_u64(compressed.len() as u64)?;
        self.write_bytes(&compressed)?;
        let chunk_length = self.position - chunk_start_offset;

        let message_index_start = self.position;
        let mut message_index_offsets = BTreeMap::new();
        for (channel_id, entries) in &index {
            message_index_offsets.insert(*channel_id, self.position);
            self.write_message_index(*channel_id, entries)?;
        }

        self.chunk_indexes.push(ChunkIndexRecord {
            message_start_time: start_time,
            message_end_time: end_time,
            chunk_start_offset,
            chunk_length,
            message_index_offsets,
            message_index_length: self.position - message_index_start,
            compressed_size: compressed.len() as u64,
            uncompressed_size: uncompressed.len() as u64,
        });

        // Reuse the allocation for the next chunk.
        self.chunk_buffer = uncompressed;
        self.chunk_buffer.clear();
        Ok(())
    }

    fn write_message_index(&mut self, channel_id: u16, entries: &[(u64, u64)]) -> Result<()> {
        let records_length = entries.len() as u64 * 16;
        self.write_u8(OP_MESSAGE_INDEX)?;
        self.write_u64(2 + 4 + records_length)?;
        self.write_u16(channel_id)?;
        self.write_u32(records_length as u32)?;
        for &(log_time, offset) in entries {
            self.write_u64(log_time)?;
            self.write_u64(offset)?;
        }
        Ok(())
    }

    fn write_schema_record(&mut self, schema: &SchemaRecord) -> Result<()> {
        self.write_u8(OP_SCHEMA)?;
        let record_length = 2
            + 4
            + schema.name.len() as u64
            + 4
            + schema.encoding.len() as u64
            + 4
            + schema.data.len() as u64;
        self.write_u64(record_length)?;
        self.write_u16(schema.id)?;
        self.write_string(&schema.name)?;
        self.write_string(&schema.encoding)?;
        self.write_u32(schema.data.len() as u32)?;
        self.write_bytes(&schema.data)
    }

    fn write_channel_record(&mut self, channel: &ChannelRecord) -> Result<()> {
        let metadata = serialize_metadata(&channel.metadata)?;
        self.write_u8(OP_CHANNEL)?;
        let record_length = 2
            + 2
            + 4
            + channel.topic.len() as u64
            + 4
            + channel.message_encoding.len() as u64
            + metadata.len() as u64;
        self.write_u64(record_length)?;
        self.write_u16(channel.id)?;
        self.write_u16(channel.schema_id)?;
        self.write_string(&channel.topic)?;
        self.write_string(&channel.message_encoding)?;
        self.write_bytes(&metadata)
    }

    fn write_statistics(&mut self) -> Result<()> {
        let map_bytes = self.channel_message_counts.len() as u64 * (2 + 8);
        self.write_u8(OP_STATISTICS)?;
        self.write_u64(8 + 2 + 4 * 4 + 8 * 2 + 4 + map_bytes)?;
        self.write_u64(self.messages_written)?;
        self.write_u16(self.schema_records.len() as u16)?;
        self.write_u32(self.channel_records.len() as u32)?;
        // attachment and metadata counts
        self.write_u32(0)?;
        self.write_u32(0)?;
        self.write_u32(self.chunk_indexes.len() as u32)?;
        let (start, end) = if self.messages_written > 0 {
            (self.message_start_time, self.message_end_time)
        } else {
            (0, 0)
        };
        self.write_u64(start)?;
        self.write_u64(end)?;
        self.write_u32(map_bytes as u32)?;
        let counts: Vec<(u16, u64)> = self
            .channel_message_counts
            .iter()
            .map(|(&k, &v)| (k, v))
            .collect();
        for (channel_id, count) in counts {
            self.write_u16(channel_id)?;
            self.write_u64(count)?;
        }
        Ok(())
    }

    fn write_chunk_index(&mut self, chunk: &ChunkIndexRecord) -> Result<()> {
        let map_bytes = chunk.message_index_offsets.len() as u64 * (2 + 8);
        self.write_u8(OP_CHUNK_INDEX)?;
        self.write_u64(8 * 7 + 4 + map_bytes + 4 + COMPRESSION_ZSTD.len() as u64)?;
        self.write_u64(chunk.message_start_time)?;
        self.write_u64(chunk.message_end_time)?;
        self.write_u64(chunk.chunk_start_offset)?;
        self.write_u64(chunk.chunk_length)?;
        self.write_u32(map_bytes as u32)?;
        for (&channel_id, &offset) in &chunk.message_index_offsets {
            self.write_u16(channel_id)?;
            self.write_u64(offset)?;
        }
        self.write_u64(chunk.message_index_length)?;
        self.write_string(COMPRESSION_ZSTD)?;
        self.write_u64(chunk.compressed_size)?;
        self.write_u64(chunk.uncompressed_size)
    }

    fn write_summary_offset(&mut self, (opcode, start, length): SummaryGroup) -> Result<()> {
        self.write_u8(OP_SUMMARY_OFFSET)?;
        self.write_u64(1 + 8 + 8)?;
        self.write_u8(opcode)?;
        self.write_u64(start)?;
        self.write_u64(length)
    }

    /// Write the trailing chunk, summary section, footer and magic, then flush.
    ///
    /// Calling `finish` twice is an error.
    pub fn finish(&mut self) -> Result<WriterSummary> {
        self.ensure_open()?;
        self.flush_chunk()?;

        self.write_u8(OP_DATA_END)?;
        self.write_u64(4)?;
        // data_section_crc = 0 disables validation
        self.write_u32(0)?;

        let summary_start = self.position;
        let mut groups: Vec<SummaryGroup> = Vec::with_capacity(4);

        let schemas = std::mem::take(&mut self.schema_records);
        if !schemas.is_empty() {
            let start = self.position;
            for schema in &schemas {
                self.write_schema_record(schema)?;
            }
            groups.push((OP_SCHEMA, start, self.position - start));
        }
        self.schema_records = schemas;

        let channels = std::mem::take(&mut self.channel_records);
        if !channels.is_empty() {
            let start = self.position;
            for channel in &channels {
                self.write_channel_record(channel)?;
            }
            groups.push((OP_CHANNEL, start, self.position - start));
        }
        self.channel_records = channels;

        let start = self.position;
        self.write_statistics()?;
        groups.push((OP_STATISTICS, start, self.position - start));

        let chunk_indexes = std::mem::take(&mut self.chunk_indexes);
        if !chunk_indexes.is_empty() {
            let start = self.position;
            for chunk in &chunk_indexes {
                self.write_chunk_index(chunk)?;
            }
            groups.push((OP_CHUNK_INDEX, start, self.position - start));
        }
        self.chunk_indexes = chunk_indexes;

        let summary_offset_start = self.position;
        for group in groups {
            self.write_summary_offset(group)?;
        }

        self.write_u8(OP_FOOTER)?;
        self.write_u64(8 + 8 + 4)?;
        self.write_u64(summary_start)?;
        self.write_u64(summary_offset_start)?;
        // summary_crc = 0 disables validation
        self.write_u32(0)?;
        self.write_bytes(&MCAP_MAGIC)?;
        self.writer
            .flush()
            .map_err(|e| ConvertError::encode(CONTEXT, format!("Failed to flush output: {e}")))?;
        self.finished = true;

        let summary = WriterSummary {
            messages: self.messages_written,
            chunks: self.chunk_indexes.len() as u64,
            channels: self.channel_records.len(),
            schemas: self.schema_records.len(),
            bytes: self.position,
        };
        debug!(
            messages = summary.messages,
            chunks = summary.chunks,
            channels = summary.channels,
            bytes = summary.bytes,
            "MCAP file finished"
        );
        Ok(summary)
    }

    /// Messages accepted so far.
    pub fn messages_written(&self) -> u64 {
        self.messages_written
    }

    /// Chunks emitted so far.
    pub fn chunks_written(&self) -> u64 {
        self.chunk_indexes.len() as u64
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Consume the writer and return the sink.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Serialize a string map with its `u32` byte-length prefix.
fn serialize_metadata(metadata: &BTreeMap<String, String>) -> Result<Vec<u8>> {
    let mut body = Vec::new();
    for (key, value) in metadata {
        body.write_u32::<LittleEndian>(key.len() as u32)?;
        body.extend_from_slice(key.as_bytes());
        body.write_u32::<LittleEndian>(value.len() as u32)?;
        body.extend_from_slice(value.as_bytes());
    }
    let mut out = Vec::with_capacity(4 + body.len());
    out.write_u32::<LittleEndian>(body.len() as u32)?;
    out.extend_from_slice(&body);
    Ok(out)
}
