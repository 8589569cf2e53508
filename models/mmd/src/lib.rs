pub mod vmd;
pub mod vmd_frames;

mod vmd_csv;
