//! A small deterministic snapshot with a fully populated dbuf hash
//! table, used by the test suites and as CLI demo data.

use crate::dbuf::DBUF_TYPE;
use scry_core::{FieldValue, MemImage, ObjectSpec, TypedHandle};

const MOS_OBJSET: u64 = 0x3000;
const HEAD_OBJSET: u64 = 0x3100;
const SNAP_OBJSET: u64 = 0x3500;

/// Four buckets, ten chained dbufs, three objsets.
///
/// Entry layout (bucket order, then chain order):
///
/// | addr   | object | lvl | blkid | holds | objset          |
/// |--------|--------|-----|-------|-------|-----------------|
/// | 0x2000 | 1      | 0   | 0     | 1     | MOS             |
/// | 0x2100 | 5      | 0   | 0     | 0     | pool/data       |
/// | 0x2200 | 2      | 0   | 1     | 0     | MOS             |
/// | 0x2300 | 2      | 0   | 3     | 0     | pool/data@snap1 |
/// | 0x2400 | 5      | 0   | 7     | 2     | pool/data       |
/// | 0x2500 | 3      | 1   | 0     | 0     | pool/data@snap1 |
/// | 0x2600 | 5      | 1   | 2     | 0     | pool/data       |
/// | 0x2700 | 6      | 0   | 9     | 3     | MOS             |
/// | 0x2800 | 7      | 0   | 4     | 0     | pool/data       |
/// | 0x2900 | 8      | 2   | 5     | 0     | MOS             |
#[must_use]
pub fn sample_image() -> MemImage {
    let mut img = MemImage::new();

    // Hash table root: mask 4, bucket array with chains
    // [0x2000 0x2100 0x2200], [0x2300 0x2400], [], [0x2500 .. 0x2900].
    img.insert(
        0x1000,
        ObjectSpec::new("dbuf_hash_table_t")
            .field("hash_table_mask", FieldValue::Int(4))
            .field(
                "hash_table",
                FieldValue::Handle(TypedHandle::new(0x1010, "dmu_buf_impl_t **")),
            ),
    );
    img.insert(
        0x1010,
        ObjectSpec::new("dmu_buf_impl_t **").elements(vec![
            FieldValue::Handle(TypedHandle::new(0x2000, DBUF_TYPE)),
            FieldValue::Handle(TypedHandle::new(0x2300, DBUF_TYPE)),
            FieldValue::Absent,
            FieldValue::Handle(TypedHandle::new(0x2500, DBUF_TYPE)),
        ]),
    );
    img.bind_symbol("dbuf_hash_table", 0x1000);

    let chains: &[&[u64]] = &[
        &[0x2000, 0x2100, 0x2200],
        &[0x2300, 0x2400],
        &[0x2500, 0x2600, 0x2700, 0x2800, 0x2900],
    ];
    // (addr, object, level, blkid, holds, objset)
    let entries: &[(u64, i64, i64, i64, i64, u64)] = &[
        (0x2000, 1, 0, 0, 1, MOS_OBJSET),
        (0x2100, 5, 0, 0, 0, HEAD_OBJSET),
        (0x2200, 2, 0, 1, 0, MOS_OBJSET),
        (0x2300, 2, 0, 3, 0, SNAP_OBJSET),
        (0x2400, 5, 0, 7, 2, HEAD_OBJSET),
        (0x2500, 3, 1, 0, 0, SNAP_OBJSET),
        (0x2600, 5, 1, 2, 0, HEAD_OBJSET),
        (0x2700, 6, 0, 9, 3, MOS_OBJSET),
        (0x2800, 7, 0, 4, 0, HEAD_OBJSET),
        (0x2900, 8, 2, 5, 0, MOS_OBJSET),
    ];
    for &(addr, object, level, blkid, holds, objset) in entries {
        let next = chains
            .iter()
            .find_map(|chain| {
                chain
                    .iter()
                    .position(|&a| a == addr)
                    .and_then(|i| chain.get(i + 1))
            })
            .map_or(FieldValue::Absent, |&a| {
                FieldValue::Handle(TypedHandle::new(a, DBUF_TYPE))
            });
        img.insert(
            addr + 0x10,
            ObjectSpec::new("dmu_buf_t").field("db_object", FieldValue::Int(object)),
        );
        img.insert(
            addr + 0x20,
            ObjectSpec::new("zfs_refcount_t").field("rc_count", FieldValue::Int(holds)),
        );
        img.insert(
            addr,
            ObjectSpec::new(DBUF_TYPE)
                .field(
                    "db",
                    FieldValue::Handle(TypedHandle::new(addr + 0x10, "dmu_buf_t")),
                )
                .field("db_level", FieldValue::Int(level))
                .field("db_blkid", FieldValue::Int(blkid))
                .field(
                    "db_holds",
                    FieldValue::Handle(TypedHandle::new(addr + 0x20, "zfs_refcount_t")),
                )
                .field(
                    "db_objset",
                    FieldValue::Handle(TypedHandle::new(objset, "objset_t")),
                )
                .field("db_hash_next", next),
        );
    }

    // The meta-objset has no dataset behind it.
    img.insert(
        MOS_OBJSET,
        ObjectSpec::new("objset_t").field("os_dsl_dataset", FieldValue::Absent),
    );

    // pool/data, a head dataset: ds_prev present, no snapshot suffix.
    img.insert(
        HEAD_OBJSET,
        ObjectSpec::new("objset_t").field(
            "os_dsl_dataset",
            FieldValue::Handle(TypedHandle::new(0x3200, "dsl_dataset_t")),
        ),
    );
    img.insert(
        0x3200,
        ObjectSpec::new("dsl_dataset_t")
            .field(
                "ds_dir",
                FieldValue::Handle(TypedHandle::new(0x3300, "dsl_dir_t")),
            )
            .field(
                "ds_prev",
                FieldValue::Handle(TypedHandle::new(0x3600, "dsl_dataset_t")),
            )
            .field("ds_snapname", FieldValue::Text(String::new())),
    );
    img.insert(
        0x3300,
        ObjectSpec::new("dsl_dir_t")
            .field("dd_myname", FieldValue::Text("data".to_string()))
            .field(
                "dd_parent",
                FieldValue::Handle(TypedHandle::new(0x3400, "dsl_dir_t")),
            ),
    );
    img.insert(
        0x3400,
        ObjectSpec::new("dsl_dir_t")
            .field("dd_myname", FieldValue::Text("pool".to_string()))
            .field("dd_parent", FieldValue::Absent),
    );

    // pool/data@snap1, a snapshot of the same dir.
    img.insert(
        SNAP_OBJSET,
        ObjectSpec::new("objset_t").field(
            "os_dsl_dataset",
            FieldValue::Handle(TypedHandle::new(0x3600, "dsl_dataset_t")),
        ),
    );
    img.insert(
        0x3600,
        ObjectSpec::new("dsl_dataset_t")
            .field(
                "ds_dir",
                FieldValue::Handle(TypedHandle::new(0x3300, "dsl_dir_t")),
            )
            .field("ds_prev", FieldValue::Absent)
            .field("ds_snapname", FieldValue::Text("snap1".to_string())),
    );

    img
}
