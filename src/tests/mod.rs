mod history;
mod procfs;
mod signals;
