// Purpose - external interfaces: the output device and MIDI input mapping

pub mod device;
pub mod midi;
