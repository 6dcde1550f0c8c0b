//! Mode listing.

use console::style;

use tessinvoke::{EngineMode, PageSegmentationMode};

pub fn cmd_modes() {
    println!("{}", style("Page segmentation modes (--psm)").bold());
    for mode in PageSegmentationMode::ALL {
        let marker = if mode == PageSegmentationMode::default() {
            " (default)"
        } else {
            ""
        };
        println!("  {:>2}  {}{}", mode.value(), mode.description(), marker);
    }

    println!();
    println!("{}", style("OCR engine modes (--oem)").bold());
    for mode in EngineMode::ALL {
        let marker = if mode == EngineMode::default() {
            " (default)"
        } else {
            ""
        };
        println!("  {:>2}  {}{}", mode.value(), mode.description(), marker);
    }
}
