use bytes::Bytes;
use futures_util::stream;
use serde_json::{Value, json};
use taskallama::{ClientError, StreamDecoder};
use tokio_util::sync::CancellationToken;

fn byte_stream(
    chunks: Vec<&'static [u8]>,
) -> impl futures_util::Stream<Item = Result<Bytes, reqwest::Error>> {
    stream::iter(
        chunks
            .into_iter()
            .map(|chunk| Ok(Bytes::from_static(chunk))),
    )
}

/// Runs a decode over `chunks`, returning what the handler saw and what the
/// call returned.
async fn decode(chunks: Vec<&'static [u8]>) -> Result<(Vec<Value>, Vec<Value>), ClientError> {
    let mut seen = Vec::new();
    let decoder = StreamDecoder::new();
    let result = decoder
        .process(byte_stream(chunks), |value| {
            seen.push(value.clone());
            Ok(())
        })
        .await?;
    Ok((seen, result))
}

#[tokio::test]
async fn reassembles_records_split_mid_object() {
    // The response field itself is split across chunk boundaries.
    let (seen, result) = decode(vec![
        b"{\"respo",
        b"nse\":\"sky\"}\n{\"resp",
        b"onse\":\" is blue\"}\n",
    ])
    .await
    .unwrap();

    assert_eq!(seen, vec![json!("sky"), json!(" is blue")]);
    assert_eq!(result, vec![json!("sky"), json!(" is blue")]);
}

#[tokio::test]
async fn one_byte_chunks_decode_identically() {
    let wire: &'static [u8] = b"{\"response\":\"a\",\"done\":false}\n{\"done\":true}\n";
    let chunks: Vec<&'static [u8]> = (0..wire.len()).map(|i| &wire[i..=i]).collect();

    let (_, split_result) = decode(chunks).await.unwrap();
    let (_, whole_result) = decode(vec![wire]).await.unwrap();

    assert_eq!(split_result, whole_result);
    assert_eq!(split_result, vec![json!("a"), json!({"done": true})]);
}

#[tokio::test]
async fn handler_order_matches_arrival_order() {
    let (seen, result) = decode(vec![b"{\"response\":\"1\"}\n{\"response\":\"2\"}\n{\"response\":\"3\"}\n"])
        .await
        .unwrap();

    assert_eq!(seen, vec![json!("1"), json!("2"), json!("3")]);
    assert_eq!(seen, result);
}

#[tokio::test]
async fn record_without_response_field_is_surfaced_whole() {
    let (seen, _) = decode(vec![b"{\"response\":\"hi\",\"done\":false}\n{\"done\":true}\n"])
        .await
        .unwrap();

    assert_eq!(seen, vec![json!("hi"), json!({"done": true})]);
}

#[tokio::test]
async fn trailing_record_without_delimiter_is_decoded() {
    let (seen, result) = decode(vec![b"{\"response\":\"first\"}\n{\"response\":\"last\"}"])
        .await
        .unwrap();

    assert_eq!(seen, vec![json!("first"), json!("last")]);
    assert_eq!(result.len(), 2);
}

#[tokio::test]
async fn unparsable_trailing_bytes_fail_with_remainder() {
    let err = decode(vec![b"{\"response\":\"ok\"}\n{\"response\":\"cut"])
        .await
        .unwrap_err();

    assert!(err.is_stream_decode());
    assert_eq!(err.stream_remainder(), Some("{\"response\":\"cut"));
}

#[tokio::test]
async fn empty_chunks_are_tolerated() {
    let (seen, _) = decode(vec![b"", b"{\"response\":\"x\"}", b"", b"\n", b""])
        .await
        .unwrap();

    assert_eq!(seen, vec![json!("x")]);
}

#[tokio::test]
async fn blank_lines_between_records_are_skipped() {
    let (seen, result) = decode(vec![b"{\"response\":\"a\"}\n\n \n{\"response\":\"b\"}\n"])
        .await
        .unwrap();

    assert_eq!(seen, vec![json!("a"), json!("b")]);
    assert_eq!(result.len(), 2);
}

#[tokio::test]
async fn empty_stream_succeeds_with_no_records() {
    let (seen, result) = decode(vec![]).await.unwrap();
    assert!(seen.is_empty());
    assert!(result.is_empty());
}

#[tokio::test]
async fn non_object_records_pass_through() {
    let (seen, _) = decode(vec![b"42\n\"plain\"\n[1,2]\n"]).await.unwrap();
    assert_eq!(seen, vec![json!(42), json!("plain"), json!([1, 2])]);
}

#[tokio::test]
async fn multibyte_utf8_split_across_chunks() {
    // "héllo" with the two-byte é split between chunks.
    let (seen, _) = decode(vec![
        b"{\"response\":\"h\xc3",
        b"\xa9llo\"}\n",
    ])
    .await
    .unwrap();

    assert_eq!(seen, vec![json!("héllo")]);
}

#[tokio::test]
async fn handler_failure_is_skipped_not_fatal() {
    let mut calls = 0u32;
    let decoder = StreamDecoder::new();
    let result = decoder
        .process(
            byte_stream(vec![b"{\"response\":\"a\"}\n{\"response\":\"b\"}\n"]),
            |_| {
                calls += 1;
                if calls == 1 {
                    Err("display failed".into())
                } else {
                    Ok(())
                }
            },
        )
        .await
        .unwrap();

    assert_eq!(calls, 2);
    assert_eq!(result, vec![json!("a"), json!("b")]);
}

#[tokio::test]
async fn cancelled_token_aborts_decode() {
    let token = CancellationToken::new();
    token.cancel();

    let decoder = StreamDecoder::with_cancellation(token);
    let err = decoder
        .process(stream::pending::<Result<Bytes, reqwest::Error>>(), |_| {
            Ok(())
        })
        .await
        .unwrap_err();

    assert!(err.is_cancelled());
}

#[tokio::test]
async fn premature_record_is_pushed_back_without_duplicate_dispatch() {
    // A raw newline inside an unterminated JSON string makes the first drain
    // emit a record that cannot parse. The decoder restores it with its
    // delimiter and retries as more chunks arrive; since the bytes before
    // that delimiter never become valid, the stream ends in the remainder
    // error, with nothing dispatched twice and nothing dropped.
    let mut seen = Vec::new();
    let decoder = StreamDecoder::new();
    let err = decoder
        .process(
            byte_stream(vec![
                b"{\"response\":\"ok\"}\n{\"bad\nrest",
                b" more\n{\"response\":\"later\"}\n",
            ]),
            |value| {
                seen.push(value.clone());
                Ok(())
            },
        )
        .await
        .unwrap_err();

    // Only the complete record fired, exactly once, even though the failing
    // record was drained again after the second chunk.
    assert_eq!(seen, vec![json!("ok")]);
    assert!(err.is_stream_decode());
    // The pushed-back record kept its delimiter and the bytes after it.
    assert_eq!(
        err.stream_remainder(),
        Some("{\"bad\nrest more\n{\"response\":\"later\"}\n")
    );
}

#[tokio::test]
async fn records_already_dispatched_before_terminal_error() {
    let mut seen = Vec::new();
    let decoder = StreamDecoder::new();
    let err = decoder
        .process(
            byte_stream(vec![b"{\"response\":\"partial\"}\n{\"broken", b""]),
            |value| {
                seen.push(value.clone());
                Ok(())
            },
        )
        .await
        .unwrap_err();

    // The handler already fired for the complete record; only the aggregate
    // result is withheld.
    assert_eq!(seen, vec![json!("partial")]);
    assert!(err.is_stream_decode());
}
