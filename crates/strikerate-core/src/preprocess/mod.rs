// Raw data cleaning: home/away innings merging and career snapshot cleaning.

pub mod career;
pub mod merge;
