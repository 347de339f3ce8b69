//! Process exit codes, one per failing command

/// Backend selection, config or connection failure
pub const CONNECTION: i32 = 1;

/// `put` failed
pub const PUT: i32 = 2;

/// `get` failed
pub const GET: i32 = 3;

/// `del` failed
pub const DELETE: i32 = 4;

/// `cas`: key already set
pub const KEY_EXISTS: i32 = 5;

/// `cas`: write failed
pub const CAS: i32 = 6;

/// `exists`: key absent
pub const KEY_ABSENT: i32 = 7;

/// No command, or an unknown one
pub const USAGE: i32 = 8;

/// `deltree` failed
pub const DELETE_TREE: i32 = 10;

/// `deltree` without a subtree argument
pub const MISSING_SUBTREE: i32 = 11;

/// `list` failed
pub const LIST: i32 = 11;

/// Writing to stdout failed
pub const IOERR: i32 = 74;
