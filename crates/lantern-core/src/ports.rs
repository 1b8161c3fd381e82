//! Audio port layout declared by a plugin.
//!
//! A layout is fixed for the lifetime of the plugin instance. Format wrappers
//! read it to answer bus queries and to size the borrowed channel arrays
//! handed to [`Plugin::process`](crate::Plugin::process).

use std::fmt;

use crate::types::{MAX_CHANNELS, MAX_PORTS};

/// Speaker grouping of a port.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum PortGroup {
    /// Left/right pair.
    #[default]
    Stereo,
    /// Single channel.
    Mono,
    /// No speaker arrangement.
    None,
}

/// A single audio input or output port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioPort {
    /// Display name shown by the host.
    pub name: &'static str,
    /// Number of channels carried by the port.
    pub channel_count: usize,
    /// Speaker grouping.
    pub group: PortGroup,
}

impl AudioPort {
    /// A two-channel port.
    pub const fn stereo(name: &'static str) -> Self {
        Self {
            name,
            channel_count: 2,
            group: PortGroup::Stereo,
        }
    }

    /// A one-channel port.
    pub const fn mono(name: &'static str) -> Self {
        Self {
            name,
            channel_count: 1,
            group: PortGroup::Mono,
        }
    }
}

/// Input and output ports of a plugin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioPorts {
    pub inputs: Vec<AudioPort>,
    pub outputs: Vec<AudioPort>,
}

impl AudioPorts {
    /// One stereo input and one stereo output.
    pub fn stereo() -> Self {
        Self {
            inputs: vec![AudioPort::stereo("Input")],
            outputs: vec![AudioPort::stereo("Output")],
        }
    }

    /// Total channel count across all input ports.
    pub fn total_input_channels(&self) -> usize {
        self.inputs.iter().map(|p| p.channel_count).sum()
    }

    /// Total channel count across all output ports.
    pub fn total_output_channels(&self) -> usize {
        self.outputs.iter().map(|p| p.channel_count).sum()
    }

    /// Check the layout against the fixed processing capacity.
    pub fn validate(&self) -> Result<(), PortsError> {
        for (ports, count) in [
            (&self.inputs, self.inputs.len()),
            (&self.outputs, self.outputs.len()),
        ] {
            if count > MAX_PORTS {
                return Err(PortsError::TooManyPorts(count));
            }
            for port in ports {
                if port.channel_count == 0 || port.channel_count > MAX_CHANNELS {
                    return Err(PortsError::InvalidChannelCount {
                        port: port.name,
                        channels: port.channel_count,
                    });
                }
            }
        }
        if self.total_input_channels() > MAX_CHANNELS || self.total_output_channels() > MAX_CHANNELS {
            return Err(PortsError::TooManyChannels);
        }
        Ok(())
    }
}

impl Default for AudioPorts {
    fn default() -> Self {
        Self::stereo()
    }
}

/// A port layout the processing buffers cannot hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortsError {
    /// More ports than `MAX_PORTS` in one direction.
    TooManyPorts(usize),
    /// A port with zero channels or more than `MAX_CHANNELS`.
    InvalidChannelCount { port: &'static str, channels: usize },
    /// More than `MAX_CHANNELS` channels summed over one direction.
    TooManyChannels,
}

impl fmt::Display for PortsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooManyPorts(count) => {
                write!(f, "{count} ports declared, at most {MAX_PORTS} supported")
            }
            Self::InvalidChannelCount { port, channels } => {
                write!(f, "port '{port}' declares {channels} channels")
            }
            Self::TooManyChannels => {
                write!(f, "more than {MAX_CHANNELS} channels in one direction")
            }
        }
    }
}

impl std::error::Error for PortsError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stereo_layout() {
        let ports = AudioPorts::stereo();
        assert_eq!(ports.total_input_channels(), 2);
        assert_eq!(ports.total_output_channels(), 2);
        assert_eq!(ports.validate(), Ok(()));
    }

    #[test]
    fn test_validate_rejects_empty_port() {
        let mut ports = AudioPorts::stereo();
        ports.inputs[0].channel_count = 0;
        assert!(matches!(
            ports.validate(),
            Err(PortsError::InvalidChannelCount { channels: 0, .. })
        ));
    }

    #[test]
    fn test_validate_rejects_too_many_ports() {
        let ports = AudioPorts {
            inputs: vec![AudioPort::mono("In"); MAX_PORTS + 1],
            outputs: vec![AudioPort::stereo("Out")],
        };
        assert_eq!(ports.validate(), Err(PortsError::TooManyPorts(MAX_PORTS + 1)));
    }

    #[test]
    fn test_validate_rejects_channel_overflow() {
        // four stereo outputs fill the channel capacity exactly
        let ports = AudioPorts {
            inputs: vec![AudioPort::stereo("In")],
            outputs: vec![
                AudioPort::stereo("A"),
                AudioPort::stereo("B"),
                AudioPort::stereo("C"),
                AudioPort::stereo("D"),
            ],
        };
        assert_eq!(ports.validate(), Ok(()));

        let mut wide = ports.clone();
        wide.outputs[3].channel_count = 3;
        assert_eq!(wide.validate(), Err(PortsError::TooManyChannels));
    }
}
