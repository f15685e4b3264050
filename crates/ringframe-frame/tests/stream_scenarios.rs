//! End-to-end parsing scenarios over a 64-byte ring buffer.

use proptest::prelude::*;
use ringframe_buffer::RingBuffer;
use ringframe_frame::{
    FieldWidth, FrameError, FrameParser, FrameSchema, PrefixScan, Rejection, Segments,
};

const CONTENT: [u8; 8] = [0x01, 0x01, 0x01, 0x01, 0x01, 0x02, 0x03, 0x04];
const LONG_PREFIX: [u8; 7] = [0xFA, 0xFB, 0xFC, 0xFD, 0xFA, 0xFB, 0xFD];
const SHORT_PREFIX: [u8; 2] = [0xEF, 0xFF];
const SUFFIX: [u8; 2] = [0x0E, 0x0F];

fn parser(name: &str, schema: FrameSchema) -> FrameParser<RingBuffer> {
    FrameParser::new(name, schema, RingBuffer::new(64).unwrap())
}

fn push(parser: &mut FrameParser<RingBuffer>, bytes: &[u8]) {
    assert_eq!(parser.window_mut().write(bytes, true), bytes.len());
}

fn expect_content(
    parser: &mut FrameParser<RingBuffer>,
    schema: Option<&FrameSchema>,
    expected: &[u8],
) {
    let handle = parser
        .next_frame(schema)
        .unwrap()
        .expect("a complete frame");
    let mut out = vec![0u8; expected.len()];
    assert_eq!(parser.extract_content(handle, &mut out).unwrap(), expected.len());
    assert_eq!(out, expected);
}

fn expect_rejection(parser: &mut FrameParser<RingBuffer>, schema: Option<&FrameSchema>) -> Rejection {
    match parser.next_frame(schema) {
        Err(FrameError::Malformed { rejection, .. }) => rejection,
        other => panic!("expected a malformed frame, got {other:?}"),
    }
}

fn frame(prefix: &[u8], body: &[&[u8]]) -> Vec<u8> {
    let mut out = prefix.to_vec();
    for part in body {
        out.extend_from_slice(part);
    }
    out
}

fn fixed(prefix: &[u8], suffix: &[u8]) -> FrameSchema {
    FrameSchema::builder(prefix)
        .fixed(CONTENT.len())
        .suffix(suffix)
        .build()
        .unwrap()
}

#[test]
fn fixed_length_with_suffix_and_schema_override() {
    let schema = fixed(&LONG_PREFIX, &SUFFIX);
    let short = fixed(&SHORT_PREFIX, &SUFFIX);
    let mut parser = parser("fixed-suffix", schema);

    push(&mut parser, &[0x33, 0xFA, 0xFB]);
    push(&mut parser, &frame(&LONG_PREFIX, &[&CONTENT, &[0x1E, 0x0F]]));
    push(&mut parser, &frame(&LONG_PREFIX, &[&CONTENT, &SUFFIX]));
    push(&mut parser, &frame(&[0x00], &[&SHORT_PREFIX, &CONTENT, &SUFFIX]));

    // The partial prefix in the leading noise is skipped and the corrupt
    // suffix rejects the first candidate.
    assert_eq!(expect_rejection(&mut parser, None), Rejection::SuffixMismatch);
    expect_content(&mut parser, None, &CONTENT);
    expect_content(&mut parser, Some(&short), &CONTENT);

    push(&mut parser, &frame(&LONG_PREFIX, &[&CONTENT, &SUFFIX]));
    expect_content(&mut parser, None, &CONTENT);

    push(&mut parser, &frame(&SHORT_PREFIX, &[&CONTENT, &SUFFIX]));
    expect_content(&mut parser, Some(&short), &CONTENT);
    assert!(parser.next_frame(None).unwrap().is_none());
}

#[test]
fn fixed_length_without_suffix() {
    let schema = fixed(&LONG_PREFIX, &[]);
    let short = fixed(&SHORT_PREFIX, &[]);
    let mut parser = parser("fixed", schema);

    push(&mut parser, &[0x33, 0xFA, 0xFB]);
    push(&mut parser, &frame(&LONG_PREFIX, &[&CONTENT]));
    push(&mut parser, &frame(&LONG_PREFIX, &[&CONTENT]));
    push(&mut parser, &frame(&[0x00], &[&SHORT_PREFIX, &CONTENT]));

    expect_content(&mut parser, None, &CONTENT);
    expect_content(&mut parser, None, &CONTENT);
    expect_content(&mut parser, Some(&short), &CONTENT);

    // Trailing bytes after a suffix-less frame are noise for the next call.
    push(&mut parser, &frame(&LONG_PREFIX, &[&CONTENT, &SUFFIX]));
    expect_content(&mut parser, None, &CONTENT);

    push(&mut parser, &frame(&SHORT_PREFIX, &[&CONTENT]));
    expect_content(&mut parser, Some(&short), &CONTENT);
}

#[test]
fn fixed_length_cursor_advances_by_frame_length() {
    let mut parser = parser("cursor", fixed(&SHORT_PREFIX, &SUFFIX));
    push(&mut parser, &frame(&SHORT_PREFIX, &[&CONTENT, &SUFFIX]));

    let before = parser.window().position();
    let handle = parser.next_frame(None).unwrap().unwrap();
    assert_eq!(handle.frame_len(), 12);
    assert_eq!(parser.window().position() - before, 12);
}

#[test]
fn dynamic_length_counting_content_with_suffix() {
    let schema = FrameSchema::builder(SHORT_PREFIX)
        .dynamic(FieldWidth::U8, Segments::CONTENT)
        .suffix(SUFFIX)
        .build()
        .unwrap();
    let mut parser = parser("dynamic-suffix", schema.clone());

    let mut stream = vec![0x33, 0xFA, 0xFB];
    stream.extend(frame(&SHORT_PREFIX, &[&[0x08], &CONTENT, &SUFFIX]));
    stream.extend(frame(&SHORT_PREFIX, &[&[0x08], &CONTENT, &[0x1E, 0x0F]]));
    stream.extend(frame(&[0x00], &[&SHORT_PREFIX, &[0x08], &CONTENT, &SUFFIX]));
    assert_eq!(stream.len(), 43);
    push(&mut parser, &stream);

    expect_content(&mut parser, Some(&schema), &CONTENT);
    assert_eq!(
        expect_rejection(&mut parser, Some(&schema)),
        Rejection::SuffixMismatch
    );
    expect_content(&mut parser, Some(&schema), &CONTENT);
}

#[test]
fn dynamic_length_counting_content_without_suffix() {
    let schema = FrameSchema::builder(SHORT_PREFIX)
        .dynamic(FieldWidth::U8, Segments::CONTENT)
        .build()
        .unwrap();
    let mut parser = parser("dynamic", schema);

    let mut stream = vec![0x33, 0xFA, 0xFB];
    stream.extend(frame(&SHORT_PREFIX, &[&[0x08], &CONTENT, &SUFFIX]));
    stream.extend(frame(&SHORT_PREFIX, &[&[0x08], &CONTENT, &[0x1E, 0x0F]]));
    stream.extend(frame(&[0x00], &[&SHORT_PREFIX, &[0x08], &CONTENT, &[0x0E]]));
    push(&mut parser, &stream);

    expect_content(&mut parser, None, &CONTENT);
    expect_content(&mut parser, None, &CONTENT);
    expect_content(&mut parser, None, &CONTENT);
    assert!(parser.next_frame(None).unwrap().is_none());
}

#[test]
fn dynamic_length_counting_header_and_checksum() {
    let schema = FrameSchema::builder([0xB5, 0x62])
        .command(FieldWidth::U16)
        .dynamic(
            FieldWidth::U16,
            Segments::PREFIX
                | Segments::COMMAND
                | Segments::LENGTH
                | Segments::CONTENT
                | Segments::CHECKSUM,
        )
        .checksum(FieldWidth::U8)
        .build()
        .unwrap();
    let mut parser = parser("ubx", schema.clone());

    let header: [u8; 6] = [0xB5, 0x62, 0x01, 0x02, 0x0F, 0x00];
    let mut stream = vec![0x33];
    stream.extend(frame(&header, &[&CONTENT, &[0x0E, 0x0F]]));
    stream.push(0x33);
    stream.extend(frame(&header, &[&CONTENT, &[0x1E, 0x0F]]));
    stream.extend(frame(&header, &[&CONTENT, &[0x0E, 0x0F]]));
    assert_eq!(stream.len(), 50);

    push(&mut parser, &stream);
    for _ in 0..3 {
        let handle = parser.next_frame(Some(&schema)).unwrap().unwrap();
        // 15 - (2 + 2 + 2 + 1)
        assert_eq!(handle.len(), 8);
        assert_eq!(handle.command(), Some(0x0201));
        assert_eq!(parser.content(&handle).unwrap().to_vec(), CONTENT);
    }

    // The same bytes again wrap around the end of the 64-byte storage.
    push(&mut parser, &stream);
    expect_content(&mut parser, Some(&schema), &CONTENT);
    expect_content(&mut parser, Some(&schema), &CONTENT);
}

#[test]
fn free_length_runs_to_first_exact_suffix() {
    let schema = FrameSchema::builder(SHORT_PREFIX)
        .free()
        .suffix(SUFFIX)
        .build()
        .unwrap();
    let mut parser = parser("free", schema.clone());

    let mut stream = vec![0x33, 0xFA, 0xFB];
    stream.extend(frame(&SHORT_PREFIX, &[&CONTENT, &SUFFIX]));
    stream.extend(frame(&SHORT_PREFIX, &[&CONTENT, &[0x1E, 0x0F]]));
    stream.extend(frame(&[0x00], &[&SHORT_PREFIX, &CONTENT, &SUFFIX]));
    assert_eq!(stream.len(), 40);
    push(&mut parser, &stream);

    expect_content(&mut parser, Some(&schema), &CONTENT);

    // The near-miss suffix and the next prefix both end up inside the content.
    let mut long = CONTENT.to_vec();
    long.extend_from_slice(&[0x1E, 0x0F, 0x00]);
    long.extend_from_slice(&SHORT_PREFIX);
    long.extend_from_slice(&CONTENT);
    assert_eq!(long.len(), 21);
    expect_content(&mut parser, Some(&schema), &long);

    assert!(parser.next_frame(Some(&schema)).unwrap().is_none());
}

#[test]
fn exhausted_window_stays_incomplete() {
    let mut parser = parser("drain", fixed(&SHORT_PREFIX, &SUFFIX));
    push(&mut parser, &frame(&SHORT_PREFIX, &[&CONTENT, &SUFFIX]));
    expect_content(&mut parser, None, &CONTENT);

    for _ in 0..3 {
        assert!(parser.next_frame(None).unwrap().is_none());
    }
    assert_eq!(parser.window().available(), 0);
}

#[test]
fn exhaustive_scan_finds_self_overlapping_prefix() {
    let prefix = [0xAA, 0xAA, 0xBB];
    let naive = FrameSchema::builder(prefix).fixed(1).build().unwrap();
    let exhaustive = FrameSchema::builder(prefix)
        .fixed(1)
        .prefix_scan(PrefixScan::Exhaustive)
        .build()
        .unwrap();
    let stream = [0xAA, 0xAA, 0xAA, 0xBB, 0x42];

    let mut parser = parser("naive", naive);
    push(&mut parser, &stream);
    assert!(parser.next_frame(None).unwrap().is_none());

    let mut parser = self::parser("exhaustive", exhaustive);
    push(&mut parser, &stream);
    expect_content(&mut parser, None, &[0x42]);
}

fn first_occurrence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

fn noise() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(
        prop::sample::select(vec![0x00u8, 0xEF, 0xFF, 0x0E, 0x0F, 0xFA, 0xFB]),
        0..40,
    )
}

proptest! {
    #[test]
    fn noise_before_a_frame_is_never_reported(noise in noise(), content in any::<[u8; 8]>()) {
        let mut stream = noise.clone();
        stream.extend(frame(&SHORT_PREFIX, &[&content, &SUFFIX]));
        prop_assume!(first_occurrence(&stream, &SHORT_PREFIX) == Some(noise.len()));

        let mut parser = parser("prop", fixed(&SHORT_PREFIX, &SUFFIX));
        push(&mut parser, &stream);
        let frame = parser.read_frame(None).unwrap().unwrap();
        prop_assert_eq!(frame.content.as_ref(), content.as_slice());
        prop_assert_eq!(frame.position, noise.len() as u64);
        prop_assert!(parser.next_frame(None).unwrap().is_none());
    }

    #[test]
    fn chunked_delivery_into_small_window_yields_every_frame(
        parts in prop::collection::vec((noise(), any::<[u8; 4]>()), 1..8),
        chunk_sizes in prop::collection::vec(1usize..9, 1..8),
    ) {
        let schema = FrameSchema::builder(SHORT_PREFIX)
            .fixed(4)
            .suffix(SUFFIX)
            .build()
            .unwrap();
        let mut stream = Vec::new();
        let mut expected = Vec::new();
        for (noise, content) in &parts {
            let noise_at = stream.len();
            stream.extend_from_slice(noise);
            prop_assume!(first_occurrence(&stream[noise_at..], &SHORT_PREFIX).is_none());
            // Noise must not combine with the frame into an earlier prefix.
            let frame_at = stream.len();
            stream.extend(frame(&SHORT_PREFIX, &[content, &SUFFIX]));
            prop_assume!(first_occurrence(&stream[noise_at..], &SHORT_PREFIX) == Some(frame_at - noise_at));
            expected.push(content.to_vec());
        }

        let mut parser = FrameParser::new("chunks", schema, RingBuffer::new(16).unwrap());
        let mut sizes = chunk_sizes.iter().cycle();
        let mut offset = 0;
        let mut seen = Vec::new();
        loop {
            while let Some(frame) = parser.read_frame(None).unwrap() {
                seen.push(frame.content.to_vec());
            }
            if offset == stream.len() {
                break;
            }
            let len = (*sizes.next().unwrap()).min(stream.len() - offset);
            offset += parser.window_mut().write(&stream[offset..offset + len], false);
        }
        prop_assert_eq!(seen, expected);
    }
}
