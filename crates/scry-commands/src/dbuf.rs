//! `dbuf` walks the global dbuf hash table and filters or prints its
//! entries. Dual-role: it produces the full walk in first position and
//! applies the same predicates to an upstream stream otherwise.

use crate::names;
use scry_core::{Fault, Image, ImageExt, TypedHandle};
use scry_pipeline::{
    Capability, CapabilitySet, Command, CommandDescriptor, ExecContext, ObjectStream, OptKind,
    OptSpec, OptionSchema, PipelineError,
};
use std::io::Write;
use tracing::debug;

pub const DBUF_TYPE: &str = "dmu_buf_impl_t *";

pub fn descriptor() -> CommandDescriptor {
    CommandDescriptor {
        names: &["dbuf", "db"],
        input_type: Some(DBUF_TYPE),
        output_type: Some(DBUF_TYPE),
        summary: "Print and filter dbuf hash table entries",
        description: "\nIn first position, walks every chain of the global dbuf hash\n\
            table in bucket order. All given filters must match for an\n\
            entry to pass. In last position, prints one row per entry\n\
            with its object, level, blkid, hold count, and objset name.",
        options: OptionSchema {
            flags: &[
                OptSpec {
                    long: "object",
                    short: Some('o'),
                    kind: OptKind::Int,
                    help: "filter: only dbufs of this object",
                },
                OptSpec {
                    long: "level",
                    short: Some('l'),
                    kind: OptKind::Int,
                    help: "filter: only dbufs of this level",
                },
                OptSpec {
                    long: "blkid",
                    short: Some('b'),
                    kind: OptKind::Int,
                    help: "filter: only dbufs of this blkid",
                },
                OptSpec {
                    long: "dataset",
                    short: Some('d'),
                    kind: OptKind::Text,
                    help: "filter: only dbufs of this dataset name (or \"MOS\")",
                },
                OptSpec {
                    long: "has-holds",
                    short: Some('H'),
                    kind: OptKind::Switch,
                    help: "filter: only dbufs that have nonzero holds",
                },
            ],
            positional: None,
        },
        capabilities: CapabilitySet::new()
            .with(Capability::Produce)
            .with(Capability::Transform)
            .with(Capability::Render),
        build: Box::new(|matches| {
            Box::new(Dbuf {
                filters: Filters {
                    object: matches.get_one::<i64>("object").copied(),
                    level: matches.get_one::<i64>("level").copied(),
                    blkid: matches.get_one::<i64>("blkid").copied(),
                    dataset: matches.get_one::<String>("dataset").cloned(),
                    has_holds: matches.get_flag("has-holds"),
                },
            })
        }),
    }
}

/// Independent optional predicates, ANDed together.
struct Filters {
    object: Option<i64>,
    level: Option<i64>,
    blkid: Option<i64>,
    dataset: Option<String>,
    has_holds: bool,
}

impl Filters {
    fn matches(&self, image: &dyn Image, db: &TypedHandle) -> Result<bool, Fault> {
        if let Some(object) = self.object {
            if object_of(image, db)? != object {
                return Ok(false);
            }
        }
        if let Some(level) = self.level {
            if image.field_int(db, "db_level")? != level {
                return Ok(false);
            }
        }
        if let Some(blkid) = self.blkid {
            if image.field_int(db, "db_blkid")? != blkid {
                return Ok(false);
            }
        }
        if self.has_holds && holds_of(image, db)? == 0 {
            return Ok(false);
        }
        if let Some(dataset) = &self.dataset {
            if names::objset_name(image, &objset_of(image, db)?)? != *dataset {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

fn object_of(image: &dyn Image, db: &TypedHandle) -> Result<i64, Fault> {
    let buf = image
        .field_handle(db, "db")?
        .ok_or_else(|| Fault(format!("{db} has no embedded dmu_buf_t")))?;
    image.field_int(&buf, "db_object")
}

fn holds_of(image: &dyn Image, db: &TypedHandle) -> Result<i64, Fault> {
    let rc = image
        .field_handle(db, "db_holds")?
        .ok_or_else(|| Fault(format!("{db} has no hold count")))?;
    image.field_int(&rc, "rc_count")
}

fn objset_of(image: &dyn Image, db: &TypedHandle) -> Result<TypedHandle, Fault> {
    image
        .field_handle(db, "db_objset")?
        .ok_or_else(|| Fault(format!("{db} belongs to no objset")))
}

/// Bucket-then-chain traversal of `dbuf_hash_table`. One engine call
/// per step; the first fault ends the walk.
struct DbufWalk<'a> {
    image: &'a dyn Image,
    buckets: TypedHandle,
    mask: u64,
    bucket: u64,
    cursor: Option<TypedHandle>,
    failed: bool,
}

impl<'a> DbufWalk<'a> {
    fn open(image: &'a dyn Image) -> Result<Self, Fault> {
        let table = image.symbol("dbuf_hash_table")?;
        let mask = u64::try_from(image.field_int(&table, "hash_table_mask")?)
            .map_err(|_| Fault("hash_table_mask is negative".to_string()))?;
        let buckets = image
            .field_handle(&table, "hash_table")?
            .ok_or_else(|| Fault("dbuf_hash_table has no bucket array".to_string()))?;
        debug!(mask, "walking dbuf hash table");
        Ok(Self {
            image,
            buckets,
            mask,
            bucket: 0,
            cursor: None,
            failed: false,
        })
    }
}

impl Iterator for DbufWalk<'_> {
    type Item = Result<TypedHandle, Fault>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        loop {
            if let Some(db) = self.cursor.take() {
                match self.image.field_handle(&db, "db_hash_next") {
                    Ok(next) => self.cursor = next,
                    Err(e) => {
                        self.failed = true;
                        return Some(Err(e));
                    }
                }
                return Some(Ok(db));
            }
            if self.bucket >= self.mask {
                return None;
            }
            let slot = self.bucket;
            self.bucket += 1;
            match self.image.element_handle(&self.buckets, slot) {
                Ok(head) => self.cursor = head,
                Err(e) => {
                    self.failed = true;
                    return Some(Err(e));
                }
            }
        }
    }
}

struct Dbuf {
    filters: Filters,
}

impl Dbuf {
    fn filtered<'a>(&'a self, image: &'a dyn Image, input: ObjectStream<'a>) -> ObjectStream<'a> {
        Box::new(input.filter_map(move |item| match item {
            Ok(db) => match self.filters.matches(image, &db) {
                Ok(true) => Some(Ok(db)),
                Ok(false) => None,
                Err(e) => Some(Err(e)),
            },
            Err(e) => Some(Err(e)),
        }))
    }
}

impl Command for Dbuf {
    fn produce<'a>(&'a self, ctx: &ExecContext<'a>) -> Result<ObjectStream<'a>, PipelineError> {
        let walk = DbufWalk::open(ctx.image)?;
        Ok(self.filtered(ctx.image, Box::new(walk)))
    }

    fn apply<'a>(
        &'a self,
        ctx: &ExecContext<'a>,
        input: ObjectStream<'a>,
    ) -> Result<ObjectStream<'a>, PipelineError> {
        Ok(self.filtered(ctx.image, input))
    }

    fn render(
        &self,
        ctx: &ExecContext<'_>,
        input: ObjectStream<'_>,
        out: &mut dyn Write,
    ) -> Result<(), PipelineError> {
        let image = ctx.image;
        writeln!(
            out,
            "{:>20} {:>8} {:>4} {:>8} {:>5} {}",
            "addr", "object", "lvl", "blkid", "holds", "os"
        )
        .map_err(PipelineError::sink)?;
        for item in input {
            let db = item?;
            let os = names::objset_name(image, &objset_of(image, &db)?)?;
            writeln!(
                out,
                "{:>20} {:>8} {:>4} {:>8} {:>5} {}",
                format!("{:#x}", db.addr),
                object_of(image, &db)?,
                image.field_int(&db, "db_level")?,
                image.field_int(&db, "db_blkid")?,
                holds_of(image, &db)?,
                os
            )
            .map_err(PipelineError::sink)?;
        }
        Ok(())
    }
}
