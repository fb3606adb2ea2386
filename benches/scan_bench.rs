use criterion::{black_box, criterion_group, criterion_main, Criterion};
use segyr::codec::{decode_samples, encode_samples};
use segyr::{
    BinaryReelHeader, Dimensionality, Endian, HeaderFormat, ReaderConfig, Revision, SampleFormat,
    SegYReader, SegYWriter, TextualHeader, TraceHeader, WriterConfig,
};
use std::io::Cursor;
use std::sync::Arc;

fn survey(num_traces: usize, ns: usize) -> Vec<u8> {
    let mut binary = BinaryReelHeader::new();
    binary.set_sample_format(SampleFormat::Float32).unwrap();
    binary.set_revision(Revision::Rev1).unwrap();
    let mut writer = SegYWriter::begin(
        Cursor::new(Vec::new()),
        TextualHeader::blank(),
        binary,
        Vec::new(),
        &WriterConfig::default(),
    )
    .unwrap();
    let samples: Vec<f64> = (0..ns).map(|i| i as f64).collect();
    let format = Arc::new(HeaderFormat::trace_rev1());
    for i in 0..num_traces {
        let mut header = TraceHeader::new(Arc::clone(&format));
        header.set("inline_num", (i / 100) as i64 + 1).unwrap();
        header.set("crossline_num", (i % 100) as i64 + 1).unwrap();
        writer.write_trace(&header, &samples).unwrap();
    }
    writer.finalize().unwrap().into_inner()
}

fn bench_open_scan(c: &mut Criterion) {
    let bytes = survey(1000, 250);

    c.bench_function("open_1000_traces", |b| {
        b.iter(|| {
            SegYReader::open(Cursor::new(black_box(bytes.as_slice())), &ReaderConfig::default())
                .unwrap()
        })
    });

    let config = ReaderConfig {
        dimensionality: Dimensionality::Three,
        ..ReaderConfig::default()
    };
    c.bench_function("open_1000_traces_with_line_catalog", |b| {
        b.iter(|| SegYReader::open(Cursor::new(black_box(bytes.as_slice())), &config).unwrap())
    });
}

fn bench_trace_reads(c: &mut Criterion) {
    let bytes = survey(1000, 250);
    let mut reader = SegYReader::open(Cursor::new(bytes), &ReaderConfig::default()).unwrap();

    c.bench_function("read_trace_250_samples", |b| {
        b.iter(|| reader.trace_samples(black_box(617)).unwrap())
    });
    c.bench_function("read_trace_header", |b| {
        b.iter(|| reader.trace_header(black_box(617)).unwrap())
    });
}

fn bench_sample_decoding(c: &mut Criterion) {
    let values: Vec<f64> = (0..65536).map(|i| (i as f64) * 0.125 - 4096.0).collect();
    let ibm = encode_samples(&values, SampleFormat::Ibm, Endian::Big).unwrap();
    let ieee = encode_samples(&values, SampleFormat::Float32, Endian::Big).unwrap();

    c.bench_function("decode_64k_ibm", |b| {
        b.iter(|| decode_samples(black_box(&ibm), SampleFormat::Ibm, Endian::Big))
    });
    c.bench_function("decode_64k_ieee", |b| {
        b.iter(|| decode_samples(black_box(&ieee), SampleFormat::Float32, Endian::Big))
    });
    c.bench_function("encode_64k_ibm", |b| {
        b.iter(|| encode_samples(black_box(&values), SampleFormat::Ibm, Endian::Big).unwrap())
    });
}

criterion_group!(
    benches,
    bench_open_scan,
    bench_trace_reads,
    bench_sample_decoding
);
criterion_main!(benches);
