mod compile;
mod crumb;
mod error;
mod ops;
mod pattern;
mod tree;
mod values;
mod walk;

pub use crumb::{Crumb, CrumbOptions};
pub use error::Error;
pub use ops::{
    build_crumbs, build_paths, difference, groupby_pattern, intersection, joint_values,
    to_columns,
};
pub use pattern::{IgnoreList, MatchMode, Pattern};
pub use tree::mktree;
pub use values::ValueTuple;

pub use crumbs_template::{parse_template, ParseError, ParseErrorKind, Template};
