use crate::config::Settings;

pub fn execute(settings: &Settings) {
    settings.print_config();
}
