/*
[INPUT]:  Interactive terminal session
[OUTPUT]: CLI helpers that need a TTY
[POS]:    CLI layer - interactive subcommands
[UPDATE]: When adding interactive flows
*/

pub mod init;
