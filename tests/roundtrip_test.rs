use segyr::{
    BinaryReelHeader, Endian, HeaderFormat, ReaderConfig, Revision, SampleFormat, SegYReader,
    SegYWriter, TextEncoding, TextualHeader, TraceHeader, WriterConfig,
};
use std::fs::File;
use std::io::Cursor;
use std::sync::Arc;
use tempfile::NamedTempFile;

fn init_logger() {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init();
}

fn reel_binary(format: SampleFormat) -> BinaryReelHeader {
    let mut binary = BinaryReelHeader::new();
    binary.set_sample_format(format).unwrap();
    binary.set_revision(Revision::Rev1).unwrap();
    binary.set("sample_interval", 2000).unwrap();
    binary
}

fn rev1_trace(ns: usize) -> TraceHeader {
    let mut header = TraceHeader::new(Arc::new(HeaderFormat::trace_rev1()));
    header.set_num_samples(ns).unwrap();
    header
}

#[test]
fn test_write_and_read_roundtrip() {
    let temp_file = NamedTempFile::new().unwrap();
    let path = temp_file.path().to_path_buf();

    let traces: [&[f64]; 2] = [&[1.0, 2.0, 3.0, 4.0], &[-1.0, 0.0, 0.5, 100.25]];

    {
        let file = File::create(&path).unwrap();
        let mut writer = SegYWriter::begin(
            file,
            TextualHeader::blank(),
            reel_binary(SampleFormat::Float32),
            Vec::new(),
            &WriterConfig::default(),
        )
        .unwrap();
        for samples in &traces {
            writer.write_trace(&rev1_trace(samples.len()), samples).unwrap();
        }
        writer.finalize().unwrap();
    }

    {
        let file = File::open(&path).unwrap();
        let mut reader = SegYReader::open(file, &ReaderConfig::default()).unwrap();
        assert_eq!(reader.trace_count(), 2);
        assert_eq!(reader.sample_format(), SampleFormat::Float32);
        assert_eq!(reader.data_start_offset(), 3600);
        for (i, samples) in traces.iter().enumerate() {
            assert_eq!(reader.num_trace_samples(i).unwrap(), 4);
            assert_eq!(reader.trace_samples(i).unwrap(), *samples);
        }
        assert_eq!(reader.trace_samples_range(1, 2, 4).unwrap(), [0.5, 100.25]);
    }
}

#[test]
fn test_byte_order_rewrite_roundtrip() {
    let temp_file = NamedTempFile::new().unwrap();
    let path = temp_file.path().to_path_buf();

    {
        let file = File::create(&path).unwrap();
        let mut writer = SegYWriter::begin(
            file,
            TextualHeader::from_lines(["C 1 BIG ENDIAN ORIGINAL"]),
            reel_binary(SampleFormat::Int32),
            Vec::new(),
            &WriterConfig::default(),
        )
        .unwrap();
        writer
            .write_trace(&rev1_trace(3), &[1234.0, -5678.0, 42.0])
            .unwrap();
        writer.finalize().unwrap();
    }

    let little = {
        let file = File::open(&path).unwrap();
        let mut source = SegYReader::open(file, &ReaderConfig::default()).unwrap();
        segyr::write_segy(
            Cursor::new(Vec::new()),
            &mut source,
            &WriterConfig {
                endian: Endian::Little,
                ..WriterConfig::default()
            },
        )
        .unwrap()
        .into_inner()
    };

    let config = ReaderConfig {
        endian: Endian::Little,
        ..ReaderConfig::default()
    };
    let mut reader = SegYReader::open(Cursor::new(little), &config).unwrap();
    assert_eq!(reader.trace_samples(0).unwrap(), [1234.0, -5678.0, 42.0]);
    assert_eq!(
        reader.textual_header().lines()[0].trim_end(),
        "C 1 BIG ENDIAN ORIGINAL"
    );
}

#[test]
fn test_ibm_to_ieee_rewrite_preserves_values() {
    let temp_file = NamedTempFile::new().unwrap();
    let path = temp_file.path().to_path_buf();

    let samples = [1.0, -118.625, 0.0, 0.15625];

    {
        let file = File::create(&path).unwrap();
        let mut writer = SegYWriter::begin(
            file,
            TextualHeader::blank(),
            reel_binary(SampleFormat::Ibm),
            Vec::new(),
            &WriterConfig::default(),
        )
        .unwrap();
        writer.write_trace(&rev1_trace(4), &samples).unwrap();
        writer.finalize().unwrap();
    }

    let ieee = {
        let file = File::open(&path).unwrap();
        let mut source = SegYReader::open(file, &ReaderConfig::default()).unwrap();
        assert_eq!(source.sample_format(), SampleFormat::Ibm);
        assert_eq!(source.trace_samples(0).unwrap(), samples);
        segyr::write_segy(
            Cursor::new(Vec::new()),
            &mut source,
            &WriterConfig {
                sample_format: Some(SampleFormat::Float32),
                ..WriterConfig::default()
            },
        )
        .unwrap()
        .into_inner()
    };

    let mut reader = SegYReader::open(Cursor::new(ieee), &ReaderConfig::default()).unwrap();
    assert_eq!(reader.sample_format(), SampleFormat::Float32);
    assert_eq!(reader.bytes_per_sample(), 4);
    assert_eq!(reader.trace_samples(0).unwrap(), samples);
}

#[test]
fn test_ebcdic_textual_header_roundtrip() {
    let temp_file = NamedTempFile::new().unwrap();
    let path = temp_file.path().to_path_buf();

    {
        let file = File::create(&path).unwrap();
        let mut writer = SegYWriter::begin(
            file,
            TextualHeader::from_lines(["C 1 CLIENT ACME GEO", "C 2 LINE 7"]),
            reel_binary(SampleFormat::Int16),
            Vec::new(),
            &WriterConfig {
                encoding: Some(TextEncoding::Ebcdic),
                ..WriterConfig::default()
            },
        )
        .unwrap();
        writer.write_trace(&rev1_trace(2), &[7.0, -7.0]).unwrap();
        writer.finalize().unwrap();
    }

    {
        // The first textual byte must be EBCDIC 'C', not ASCII.
        let raw = std::fs::read(&path).unwrap();
        assert_eq!(raw[0], 0xC3);

        let file = File::open(&path).unwrap();
        let config = ReaderConfig {
            encoding: TextEncoding::Ebcdic,
            ..ReaderConfig::default()
        };
        let mut reader = SegYReader::open(file, &config).unwrap();
        assert_eq!(
            reader.textual_header().lines()[0].trim_end(),
            "C 1 CLIENT ACME GEO"
        );
        assert_eq!(reader.trace_samples(0).unwrap(), [7.0, -7.0]);
    }
}

#[test]
fn test_extended_headers_with_count_sentinel() {
    let temp_file = NamedTempFile::new().unwrap();
    let path = temp_file.path().to_path_buf();

    let history = "line 7 reprocessed\n".repeat(50);
    let pages = segyr::text::format_extended_text(&history, false);
    assert_eq!(pages.len(), 2);

    {
        let mut binary = reel_binary(SampleFormat::Float32);
        binary.set_num_extended_textual_headers(-1).unwrap();
        let file = File::create(&path).unwrap();
        let mut writer = SegYWriter::begin(
            file,
            TextualHeader::blank(),
            binary,
            pages.clone(),
            &WriterConfig::default(),
        )
        .unwrap();
        writer.write_trace(&rev1_trace(1), &[1.5]).unwrap();
        writer.finalize().unwrap();
    }

    {
        let file = File::open(&path).unwrap();
        let mut reader = SegYReader::open(file, &ReaderConfig::default()).unwrap();
        assert_eq!(reader.extended_headers(), &pages[..]);
        assert_eq!(reader.binary_reel_header().num_extended_textual_headers(), -1);
        // Terminator page consumed: traces start after three extended records.
        assert_eq!(reader.data_start_offset(), 3600 + 3 * 3200);
        assert_eq!(reader.trace_samples(0).unwrap(), [1.5]);
    }
}

#[test]
fn test_strict_mode_rejects_inconsistent_declared_length() {
    init_logger();
    let temp_file = NamedTempFile::new().unwrap();
    let path = temp_file.path().to_path_buf();

    {
        let mut binary = reel_binary(SampleFormat::Float32);
        binary.set_num_samples(4).unwrap();
        binary.set("fixed_length_trace_flag", 1).unwrap();
        let file = File::create(&path).unwrap();
        let mut writer = SegYWriter::begin(
            file,
            TextualHeader::blank(),
            binary,
            Vec::new(),
            &WriterConfig::default(),
        )
        .unwrap();
        writer
            .write_trace(&rev1_trace(4), &[1.0, 2.0, 3.0, 4.0])
            .unwrap();
        writer.write_trace(&rev1_trace(2), &[9.0, 9.0]).unwrap();
        writer.finalize().unwrap();
    }

    {
        let file = File::open(&path).unwrap();
        let strict = ReaderConfig {
            strict: true,
            ..ReaderConfig::default()
        };
        assert!(matches!(
            SegYReader::open(file, &strict),
            Err(segyr::SegYError::InconsistentMetadata { .. })
        ));

        // Lenient mode trusts the scan and serves both traces.
        let file = File::open(&path).unwrap();
        let mut reader = SegYReader::open(file, &ReaderConfig::default()).unwrap();
        assert_eq!(reader.trace_count(), 2);
        assert_eq!(reader.trace_samples(1).unwrap(), [9.0, 9.0]);
    }
}

#[test]
fn test_custom_header_format_over_json() {
    let temp_file = NamedTempFile::new().unwrap();
    let path = temp_file.path().to_path_buf();

    let custom = HeaderFormat::from_json(
        r#"{
            "name": "acme-2019",
            "record_len": 240,
            "fields": [
                {"name": "num_samples", "offset": 114, "kind": "uint16"},
                {"name": "shot_id", "offset": 232, "kind": "int32"}
            ]
        }"#,
    )
    .unwrap();
    let custom = Arc::new(custom);

    {
        let mut header = TraceHeader::new(Arc::clone(&custom));
        header.set_num_samples(2).unwrap();
        header.set("shot_id", 776_001).unwrap();

        let file = File::create(&path).unwrap();
        let mut writer = SegYWriter::begin(
            file,
            TextualHeader::blank(),
            reel_binary(SampleFormat::Float32),
            Vec::new(),
            &WriterConfig::default(),
        )
        .unwrap();
        writer.write_trace(&header, &[3.0, 4.0]).unwrap();
        writer.finalize().unwrap();
    }

    {
        let file = File::open(&path).unwrap();
        let config = ReaderConfig {
            trace_format: Some((*custom).clone()),
            ..ReaderConfig::default()
        };
        let mut reader = SegYReader::open(file, &config).unwrap();
        let header = reader.trace_header(0).unwrap();
        assert_eq!(header.get("shot_id").unwrap(), 776_001);
        assert_eq!(reader.trace_samples(0).unwrap(), [3.0, 4.0]);
    }
}
