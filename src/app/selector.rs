use std::sync::Mutex;

use crate::device::PortSelector;

/// Port selection driven by the `connect [port]` command.
///
/// The choice (a 1-based index into the listed ports, or a port name) is set
/// just before connecting. Without a choice a lone port is taken as-is; with
/// several ports the candidates are listed and the request is declined.
#[derive(Default)]
pub struct SessionPortSelector {
    choice: Mutex<Option<String>>,
}

impl SessionPortSelector {
    pub fn new(choice: Option<String>) -> Self {
        Self {
            choice: Mutex::new(choice),
        }
    }

    /// Choice for the next connection attempt only.
    pub fn choose(&self, choice: Option<String>) {
        *self.choice.lock().unwrap_or_else(|e| e.into_inner()) = choice;
    }
}

impl PortSelector for SessionPortSelector {
    fn select(&self, candidates: &[String]) -> Option<String> {
        let choice = self.choice.lock().unwrap_or_else(|e| e.into_inner()).take();

        match choice {
            Some(choice) => resolve_choice(choice.trim(), candidates),
            None if candidates.len() == 1 => Some(candidates[0].clone()),
            None => {
                println!("Several serial ports are available:");
                print_candidates(candidates);
                println!("Pick one with `connect <number>` or `connect <port>`.");
                None
            }
        }
    }
}

fn resolve_choice(choice: &str, candidates: &[String]) -> Option<String> {
    if let Ok(index) = choice.parse::<usize>() {
        let picked = index.checked_sub(1).and_then(|i| candidates.get(i)).cloned();
        if picked.is_none() {
            log::warn!("No serial port numbered {}", index);
            print_candidates(candidates);
        }
        return picked;
    }

    if let Some(found) = candidates.iter().find(|name| name.as_str() == choice) {
        return Some(found.clone());
    }
    log::warn!("Serial port '{}' is not available", choice);
    print_candidates(candidates);
    None
}

fn print_candidates(candidates: &[String]) {
    for (index, name) in candidates.iter().enumerate() {
        println!("  {}) {}", index + 1, name);
    }
}
