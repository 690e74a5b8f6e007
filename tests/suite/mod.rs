mod pane_count;
mod persistence;
mod provider_switch;
mod quick_prompt;
mod recovery;
mod sidebar;
