use mysekai_reader::mysekai::codec::{self, Value};
use mysekai_reader::mysekai::crypto;
use mysekai_reader::mysekai::decoder;
use mysekai_reader::{Snapshot, SnapshotError};

const KEY: [u8; 16] = *b"0123456789abcdef";
const IV: [u8; 16] = *b"fedcba9876543210";

fn s(v: &str) -> Value {
    Value::Str(v.to_string())
}

fn map(entries: Vec<(&str, Value)>) -> Value {
    Value::Map(
        entries
            .into_iter()
            .map(|(k, v)| (s(k), v))
            .collect(),
    )
}

/// A record tree shaped like a real snapshot, small enough to eyeball.
fn sample_snapshot_tree() -> Value {
    map(vec![
        (
            "updatedResources",
            map(vec![
                ("now", Value::Int(1_700_000_000_000)),
                (
                    "userMysekaiHarvestMaps",
                    Value::Array(vec![map(vec![
                        ("mysekaiSiteId", Value::Int(5)),
                        (
                            "userMysekaiSiteHarvestResourceDrops",
                            Value::Array(vec![map(vec![
                                ("resourceType", s("mysekai_material")),
                                ("resourceId", Value::Int(2)),
                                ("quantity", Value::Int(3)),
                                ("positionX", Value::Float(1.5)),
                                ("positionZ", Value::Float(-2.25)),
                                ("mysekaiSiteHarvestResourceDropStatus", s("before_drop")),
                            ])]),
                        ),
                    ])]),
                ),
                (
                    "userMysekaiMusicRecords",
                    Value::Array(vec![
                        map(vec![("mysekaiMusicRecordId", Value::Int(11))]),
                        map(vec![("mysekaiMusicRecordId", Value::Int(42))]),
                    ]),
                ),
            ]),
        ),
        (
            "mysekaiPhenomenaSchedules",
            Value::Array(vec![
                map(vec![("mysekaiPhenomenaId", Value::Int(3))]),
                map(vec![("mysekaiPhenomenaId", Value::Int(7))]),
            ]),
        ),
    ])
}

#[test]
fn codec_round_trip_preserves_values() {
    let tree = map(vec![
        ("nil", Value::Nil),
        ("yes", Value::Bool(true)),
        ("no", Value::Bool(false)),
        ("small", Value::Int(7)),
        ("negative", Value::Int(-42)),
        ("wide", Value::Int(9_007_199_254_740_993)),
        ("deep-negative", Value::Int(i64::MIN)),
        ("huge", Value::UInt(u64::MAX)),
        ("float", Value::Float(-273.15)),
        ("whole-float", Value::Float(2.0)),
        ("text", s("ハーベスト")),
        ("blob", Value::Bin(vec![0, 1, 2, 254, 255])),
        (
            "list",
            Value::Array(vec![Value::Int(1), s("two"), Value::Float(3.5)]),
        ),
        ("nested", map(vec![("inner", Value::Array(vec![Value::Nil]))])),
    ]);

    let bytes = codec::encode(&tree).expect("encode");
    let decoded = codec::decode(&bytes).expect("decode");
    assert_eq!(tree, decoded);
}

#[test]
fn codec_keeps_integer_float_distinction() {
    // 2 as an integer and 2.0 as a float must not collapse.
    let int_bytes = codec::encode(&Value::Int(2)).expect("encode int");
    let float_bytes = codec::encode(&Value::Float(2.0)).expect("encode float");
    assert_ne!(int_bytes, float_bytes);

    assert_eq!(codec::decode(&int_bytes).expect("decode int"), Value::Int(2));
    assert_eq!(
        codec::decode(&float_bytes).expect("decode float"),
        Value::Float(2.0)
    );
}

#[test]
fn codec_rejects_truncated_input() {
    let bytes = codec::encode(&sample_snapshot_tree()).expect("encode");
    let truncated = &bytes[..bytes.len() - 1];
    match codec::decode(truncated) {
        Err(SnapshotError::MalformedRecordTree(_)) => {}
        other => panic!("expected MalformedRecordTree, got {:?}", other),
    }
}

#[test]
fn codec_rejects_trailing_bytes() {
    let mut bytes = codec::encode(&Value::Int(1)).expect("encode");
    bytes.push(0xc0);
    match codec::decode(&bytes) {
        Err(SnapshotError::MalformedRecordTree(msg)) => {
            assert!(msg.contains("trailing"), "unexpected message: {}", msg)
        }
        other => panic!("expected MalformedRecordTree, got {:?}", other),
    }
}

#[test]
fn codec_rejects_ext_and_reserved_markers() {
    // fixext1, ext8, reserved 0xc1
    for bad in [&[0xd4u8, 0x01, 0x00][..], &[0xc7, 0x01, 0x01, 0x00][..], &[0xc1][..]] {
        match codec::decode(bad) {
            Err(SnapshotError::MalformedRecordTree(_)) => {}
            other => panic!("expected MalformedRecordTree for {:?}, got {:?}", bad, other),
        }
    }
}

#[test]
fn codec_rejects_oversized_length_prefix() {
    // str32 declaring 4 GiB with a 1-byte body
    let bad = [0xdb, 0xff, 0xff, 0xff, 0xff, 0x41];
    match codec::decode(&bad) {
        Err(SnapshotError::MalformedRecordTree(_)) => {}
        other => panic!("expected MalformedRecordTree, got {:?}", other),
    }
}

#[test]
fn value_accessors_walk_the_tree() {
    let tree = sample_snapshot_tree();
    let updated = tree.get("updatedResources").expect("section");
    assert_eq!(updated.get("now").and_then(Value::as_i64), Some(1_700_000_000_000));

    let maps = updated
        .get("userMysekaiHarvestMaps")
        .and_then(|v| v.as_array())
        .expect("maps");
    assert_eq!(maps.len(), 1);

    // Integer positions widen through as_f64.
    assert_eq!(Value::Int(3).as_f64(), Some(3.0));
    assert_eq!(Value::Float(3.25).as_f64(), Some(3.25));
    assert_eq!(s("3").as_f64(), None);
}

#[test]
fn encrypt_decrypt_round_trip() {
    let tree = sample_snapshot_tree();
    let blob = decoder::encode_and_encrypt(&tree, &KEY, &IV).expect("encrypt");
    // CBC + PKCS#7 output is block-aligned and never empty.
    assert!(!blob.is_empty());
    assert_eq!(blob.len() % 16, 0);

    let decoded = decoder::decrypt_and_decode(&blob, &KEY, &IV).expect("decrypt");
    assert_eq!(tree, decoded);
}

#[test]
fn snapshot_facade_reads_sections() {
    let blob = decoder::encode_and_encrypt(&sample_snapshot_tree(), &KEY, &IV).expect("encrypt");
    let snapshot = Snapshot::from_encrypted(&blob, &KEY, &IV).expect("snapshot");

    assert_eq!(snapshot.updated_at_millis(), Some(1_700_000_000_000));
    assert_eq!(snapshot.harvest_maps().len(), 1);
    assert_eq!(snapshot.phenomena_schedules().len(), 2);
    assert!(snapshot.harvest_map_for_site(5).is_some());
    assert!(snapshot.harvest_map_for_site(8).is_none());

    let records = snapshot.owned_music_record_ids();
    assert!(records.contains(&11) && records.contains(&42));
    assert_eq!(records.len(), 2);
}

#[test]
fn bad_padding_is_rejected() {
    use aes::cipher::{block_padding::NoPadding, BlockEncryptMut, KeyIvInit};
    type Enc = cbc::Encryptor<aes::Aes128>;

    // A raw block whose final byte (0x00) is not a legal PKCS#7 pad length.
    let block = [0u8; 16];
    let forged = Enc::new_from_slices(&KEY, &IV)
        .expect("cipher")
        .encrypt_padded_vec_mut::<NoPadding>(&block);

    match crypto::decrypt(&forged, &KEY, &IV) {
        Err(SnapshotError::BadPadding) => {}
        other => panic!("expected BadPadding, got {:?}", other),
    }
}

#[test]
fn key_material_is_validated() {
    let blob = decoder::encode_and_encrypt(&Value::Nil, &KEY, &IV).expect("encrypt");

    match crypto::decrypt(&blob, &KEY[..10], &IV) {
        Err(SnapshotError::BadKeyLength(10)) => {}
        other => panic!("expected BadKeyLength, got {:?}", other),
    }
    match crypto::decrypt(&blob, &KEY, &IV[..8]) {
        Err(SnapshotError::BadIvLength(8)) => {}
        other => panic!("expected BadIvLength, got {:?}", other),
    }
    match crypto::decrypt(&blob[..15], &KEY, &IV) {
        Err(SnapshotError::BadCiphertextLength(15)) => {}
        other => panic!("expected BadCiphertextLength, got {:?}", other),
    }

    // AES-256 works too.
    let key32 = [0x5au8; 32];
    let blob = decoder::encode_and_encrypt(&Value::Int(9), &key32, &IV).expect("encrypt-256");
    assert_eq!(
        decoder::decrypt_and_decode(&blob, &key32, &IV).expect("decrypt-256"),
        Value::Int(9)
    );
}

#[test]
fn pretty_dump_is_valid_json() {
    let snapshot = Snapshot::from_tree(sample_snapshot_tree());
    let dump = snapshot.to_pretty_json();
    let parsed: serde_json::Value = serde_json::from_str(&dump).expect("valid json");
    assert_eq!(
        parsed["updatedResources"]["now"],
        serde_json::json!(1_700_000_000_000i64)
    );
}
