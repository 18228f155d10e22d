#[path = "e2e/caravan_walkthrough.rs"]
mod caravan_walkthrough;

#[path = "e2e/host_commands.rs"]
mod host_commands;

#[path = "e2e/feedback_timing.rs"]
mod feedback_timing;

#[path = "e2e/multi_widget_resume.rs"]
mod multi_widget_resume;
