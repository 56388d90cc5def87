mod settings;

pub use settings::{
    DEFAULT_MAX_LINES, FeedConfig, OutputFormat, Settings, SlackConfig, load_settings,
    settings_from_lookup, split_list,
};
