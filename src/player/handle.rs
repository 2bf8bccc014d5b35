use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use super::thread::spawn_player_thread;
use super::types::{PlayerCmd, PlayerHandle, PlayerInfo};

/// Owning handle for the playback worker thread.
pub struct Player {
    tx: Sender<PlayerCmd>,
    info: PlayerHandle,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl Player {
    /// Spawn the worker and set its initial volume.
    pub fn new(volume: f32) -> Self {
        let (tx, rx) = mpsc::channel::<PlayerCmd>();
        let info: PlayerHandle = Arc::new(Mutex::new(PlayerInfo::default()));
        let worker = spawn_player_thread(rx, info.clone());

        let player = Self {
            tx,
            info,
            join: Mutex::new(Some(worker)),
        };
        let _ = player.send(PlayerCmd::SetVolume(volume));
        player
    }

    pub fn info_handle(&self) -> PlayerHandle {
        self.info.clone()
    }

    pub fn send(&self, cmd: PlayerCmd) -> Result<(), mpsc::SendError<PlayerCmd>> {
        self.tx.send(cmd)
    }

    /// Stop playback and join the worker.
    pub fn quit(&self) {
        let _ = self.send(PlayerCmd::Quit);

        if let Ok(mut j) = self.join.lock() {
            if let Some(h) = j.take() {
                let _ = h.join();
            }
        }
    }
}
