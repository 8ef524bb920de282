//! Terminal presentation helpers

pub mod progress;
pub mod styling;

pub use progress::{create_download_bar, create_spinner, finish_with_success};
pub use styling::{
    print_banner, print_completion, print_config, print_count, print_info, print_step_header,
    print_step_time, print_success,
};
