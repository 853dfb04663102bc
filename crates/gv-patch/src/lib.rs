//! gv-patch: the change-set engine.
//!
//! A patch is an ASCII text of `ACTION:PATH:PAYLOAD` lines describing how to
//! move one directory state to the next. Small files are replaced whole
//! (`CREATE`/`MODIFY`), vanished files are `DELETE`d, and large files with
//! small in-place edits become sequences of `BINDIFF` range overwrites. The
//! crate also owns the gzip'd tar base archive and the sequential replay
//! that rebuilds a vault's plaintext from base + patch log.

pub mod apply;
pub mod archive;
pub mod diff;
pub mod record;
pub mod replay;

pub use apply::apply_changeset;
pub use archive::{pack_dir, unpack_archive};
pub use diff::{diff_runs, synthesize, MODIFY_WHOLE_LIMIT, RUN_GAP_MERGE, RUN_MAX_LEN};
pub use record::{encode_changeset, parse_changeset, ChangeRecord};
pub use replay::replay;
