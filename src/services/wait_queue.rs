//! Cola de espera FIFO de vehículos sin plaza

use std::collections::VecDeque;

#[derive(Debug, Default, Clone)]
pub struct WaitQueue {
    entries: VecDeque<String>,
}

impl WaitQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Encola al final y devuelve la posición (1-based)
    pub fn push(&mut self, vehicle_number: String) -> usize {
        self.entries.push_back(vehicle_number);
        self.entries.len()
    }

    pub fn front(&self) -> Option<&str> {
        self.entries.front().map(String::as_str)
    }

    pub fn pop_front(&mut self) -> Option<String> {
        self.entries.pop_front()
    }

    pub fn contains(&self, vehicle_number: &str) -> bool {
        self.entries.iter().any(|v| v == vehicle_number)
    }

    /// Quita un vehículo de cualquier posición
    pub fn remove(&mut self, vehicle_number: &str) -> bool {
        match self.entries.iter().position(|v| v == vehicle_number) {
            Some(index) => self.entries.remove(index).is_some(),
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Matrículas en orden de llegada
    pub fn snapshot(&self) -> Vec<String> {
        self.entries.iter().cloned().collect()
    }
}
