// Copyright (c) 2021 Xu Shaohua <shaohua@biofan.org>. All rights reserved.
// Use of this source is governed by Affero General Public License that can be found
// in the LICENSE file.

//! Handles commands from dispatcher.

use super::BackendsApp;
use crate::commands::DispatcherToBackendsCmd;
use crate::error::Error;

impl BackendsApp {
    pub(super) async fn handle_dispatcher_cmd(
        &mut self,
        cmd: DispatcherToBackendsCmd,
    ) -> Result<(), Error> {
        log::info!("cmd: {:?}", cmd);
        match cmd {}
    }
}
