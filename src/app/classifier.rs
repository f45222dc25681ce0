//! Temperature banding for the tri-colour indicator.
//!
//! | Band        | Range            | Lit channel |
//! |-------------|------------------|-------------|
//! | Cold        | `c <= 0`         | Blue        |
//! | Comfortable | `0 < c <= 35`    | Green       |
//! | Hot         | `c > 35`         | Red         |
//!
//! Bands are checked in ascending order, so exactly one matches any real
//! input. NaN is not a real input; the sensor adapter rejects it before it
//! gets here.

use super::payload::Payload;

/// Upper bound (inclusive) of the cold band, in °C.
pub const COLD_MAX_C: f32 = 0.0;
/// Upper bound (inclusive) of the comfortable band, in °C.
pub const COMFORT_MAX_C: f32 = 35.0;

/// Indicator colour channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Red,
    Green,
    Blue,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::Red, Channel::Green, Channel::Blue];
}

/// Drive level for one channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    On,
    Off,
}

/// One `{ channel, level }` instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelCommand {
    pub channel: Channel,
    pub level: Level,
}

/// Full indicator state: one instruction per channel.
///
/// Instructions are ordered off-first so a channel swap never shows two
/// colours at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndicatorCommand {
    commands: [ChannelCommand; 3],
}

impl IndicatorCommand {
    /// Light `lit` and switch the other two channels off.
    pub fn only(lit: Channel) -> Self {
        let mut commands = [ChannelCommand {
            channel: lit,
            level: Level::On,
        }; 3];
        let mut slot = 0;
        for channel in Channel::ALL {
            if channel != lit {
                commands[slot] = ChannelCommand {
                    channel,
                    level: Level::Off,
                };
                slot += 1;
            }
        }
        Self { commands }
    }

    /// Every channel off.
    pub fn all_off() -> Self {
        Self {
            commands: Channel::ALL.map(|channel| ChannelCommand {
                channel,
                level: Level::Off,
            }),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChannelCommand> {
        self.commands.iter()
    }

    /// Commanded level for `channel`.
    pub fn level(&self, channel: Channel) -> Level {
        self.commands
            .iter()
            .find(|c| c.channel == channel)
            .map_or(Level::Off, |c| c.level)
    }

    /// Channels commanded on.
    pub fn lit(&self) -> impl Iterator<Item = Channel> + '_ {
        self.commands
            .iter()
            .filter(|c| c.level == Level::On)
            .map(|c| c.channel)
    }
}

/// Temperature band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemperatureBand {
    Cold,
    Comfortable,
    Hot,
}

impl TemperatureBand {
    pub fn of(celsius: f32) -> Self {
        if celsius <= COLD_MAX_C {
            Self::Cold
        } else if celsius <= COMFORT_MAX_C {
            Self::Comfortable
        } else {
            Self::Hot
        }
    }

    pub fn channel(self) -> Channel {
        match self {
            Self::Cold => Channel::Blue,
            Self::Comfortable => Channel::Green,
            Self::Hot => Channel::Red,
        }
    }
}

/// Everything derived from one temperature reading.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub band: TemperatureBand,
    pub command: IndicatorCommand,
    pub payload: Payload,
}

pub fn celsius_to_fahrenheit(celsius: f32) -> f32 {
    celsius * 9.0 / 5.0 + 32.0
}

/// Classify a reading and format the temperature message.
pub fn classify(celsius: f32) -> Classification {
    let band = TemperatureBand::of(celsius);
    let fahrenheit = celsius_to_fahrenheit(celsius);
    let reading = format!("{celsius:.1}C / {fahrenheit:.1}F");
    Classification {
        band,
        command: IndicatorCommand::only(band.channel()),
        payload: Payload::two_line("Temperature:", &reading),
    }
}
