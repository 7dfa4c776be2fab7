// Copyright (c) 2021 Xu Shaohua <shaohua@biofan.org>. All rights reserved.
// Use of this source is governed by Affero General Public License that can be found
// in the LICENSE file.

use clap::{Arg, ArgAction};
use mqttd::auth::file_auth;
use mqttd::Error;

const OPT_DELETE: &str = "delete";
const OPT_UPDATE: &str = "update";
const OPT_PASSWORD_FILE: &str = "passwordfile";
const OPT_USERNAME: &str = "username";
const OPT_PASSWORD: &str = "password";

fn main() -> Result<(), Error> {
    std::env::set_var("RUST_LOG", "info");
    env_logger::init();

    let matches = clap::Command::new("mqttd-passwd")
        .version("0.1.0")
        .about("mqttd-passwd is a tool for managing password files for mqttd")
        .arg(
            Arg::new(OPT_DELETE)
                .short('D')
                .long(OPT_DELETE)
                .action(ArgAction::SetTrue)
                .help("delete the username rather than adding/updating its password"),
        )
        .arg(
            Arg::new(OPT_UPDATE)
                .short('U')
                .long(OPT_UPDATE)
                .action(ArgAction::SetTrue)
                .help("update a plain text password file to use hashed passwords"),
        )
        .arg(
            Arg::new(OPT_PASSWORD_FILE)
                .required(true)
                .help("passwordfile will be created if not exist"),
        )
        .arg(Arg::new(OPT_USERNAME).required(true))
        .arg(Arg::new(OPT_PASSWORD))
        .get_matches();

    let passwd_file = matches
        .get_one::<String>(OPT_PASSWORD_FILE)
        .expect("passwordfile is required");
    let username = matches
        .get_one::<String>(OPT_USERNAME)
        .expect("username is required");

    if matches.get_flag(OPT_UPDATE) {
        return file_auth::update_file_hash(passwd_file);
    }

    if matches.get_flag(OPT_DELETE) {
        return file_auth::add_delete_users(passwd_file, &[], &[username.as_str()]);
    }

    let password = matches
        .get_one::<String>(OPT_PASSWORD)
        .expect("password is required when adding or updating a user");
    let entry = format!("{}:{}", username, password);
    file_auth::add_delete_users(passwd_file, &[entry.as_str()], &[])
}
