mod document;
mod notes;
mod package;
mod revisions;
mod styles;
mod tables;
