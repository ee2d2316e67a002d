pub mod tle;
