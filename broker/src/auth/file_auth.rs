// Copyright (c) 2021 Xu Shaohua <shaohua@biofan.org>. All rights reserved.
// Use of this source is governed by Affero General Public License that can be found
// in the LICENSE file.

//! Flat-file password backend, loaded once at startup.

use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use super::pwd::Password;
use crate::error::{Error, ErrorKind};

#[derive(Debug)]
pub struct FileAuth {
    users: BTreeMap<String, Password>,
}

impl FileAuth {
    pub fn new<P: AsRef<Path>>(passwd_file: P) -> Result<Self, Error> {
        let fd = File::open(passwd_file.as_ref())?;
        let reader = BufReader::new(fd);
        let mut users = BTreeMap::new();
        for line in reader.lines() {
            let line = line?;
            if let Some((username, password)) = Password::parse(&line)? {
                users.insert(username.to_string(), password);
            }
        }
        Ok(Self { users })
    }

    /// Checks `(username, password)` against the loaded records.
    ///
    /// # Errors
    ///
    /// Returns error if the digest cannot be computed.
    pub fn is_match(&self, username: &str, password: &[u8]) -> Result<bool, Error> {
        self.users
            .get(username)
            .map_or(Ok(false), |record| record.is_match(password))
    }
}

pub fn update_file_hash<P: AsRef<Path>>(passwd_file: P) -> Result<(), Error> {
    let fd = File::open(passwd_file.as_ref())?;
    let reader = BufReader::new(fd);
    let mut result = String::new();
    for line in reader.lines() {
        let line = line?;
        match Password::parse_raw_text(&line) {
            Err(err) => {
                log::error!("err: {:?}, line: {}", err, line);
            }
            Ok(None) => {
                // continue
            }
            Ok(Some((username, password))) => {
                let hashed_line = password.dump(username);
                result.push_str(&hashed_line);
                result.push('\n');
            }
        }
    }

    let mut fd = OpenOptions::new()
        .write(true)
        .truncate(true)
        .open(passwd_file.as_ref())?;
    fd.write_all(result.as_bytes()).map_err(Into::into)
}

pub fn add_delete_users<P: AsRef<Path>>(
    passwd_file: P,
    add_users: &[&str],
    delete_users: &[&str],
) -> Result<(), Error> {
    let fd = OpenOptions::new()
        .create(true)
        .read(true)
        .write(true)
        .open(passwd_file.as_ref())?;
    let reader = BufReader::new(fd);
    let mut users = BTreeMap::new();
    for line in reader.lines() {
        let line = line?;
        match Password::parse(&line) {
            Err(err) => {
                log::error!("Failed to parse line {:?}, got err: {:?}", line, err);
                return Err(err);
            }
            Ok(None) => {
                // continue
            }
            Ok(Some((username, password))) => {
                users.insert(username.to_string(), password);
            }
        }
    }

    // Add/update users.
    for item in add_users {
        match Password::parse_raw_text(item) {
            Err(err) => {
                log::error!("Failed to parse pair {:?}, got err: {:?}", item, err);
                return Err(err);
            }
            Ok(None) => {
                log::info!("Ignore empty line: {}", item);
            }
            Ok(Some((username, password))) => {
                users.insert(username.to_string(), password);
            }
        }
    }

    // Delete users.
    for username in delete_users {
        if username.contains(':') {
            return Err(Error::from_string(
                ErrorKind::FormatError,
                format!("Invalid username to delete: {:?}", username),
            ));
        }

        users.remove(*username);
    }

    let mut fd = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(passwd_file.as_ref())?;
    for (username, password) in users {
        let line = password.dump(&username);
        log::info!("line: {}", line);
        fd.write_all(line.as_bytes())?;
        fd.write_all(b"\n")?;
    }

    Ok(())
}
