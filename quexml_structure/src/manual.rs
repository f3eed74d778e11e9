/*!

This is the long-form manual for `quexml_structure` and `quexml`.

## The queXML dialect

The parser reads the queXML export of LimeSurvey. Only the elements below are
looked at, the others (`investigator`, `dataCollector`, `administration`, ...)
are ignored.

```text
questionnaire                      root, optional <title>
  section id="N"                   N must be an integer
    sectionInfo                    <position> title | before | after, <text>*
    question
      text                         the question label (first one used)
      directive                    help text, <text>* (first directive used)
      subQuestion varName="..."    <text>
      response varName="..."
        free                       <format>? <length>? <label>?
        fixed
          category                 <label> <value> <contingentQuestion>?
            contingentQuestion varName="..."   <text>? <length>? <format>?
```

All the text is cleaned before it reaches the model: the escaped HTML that
LimeSurvey embeds is removed, HTML entities such as `&uuml;` or `&#8211;` are
decoded and whitespace is collapsed to single spaces. A `<!DOCTYPE>`
declaration at the top of the document is accepted.

## From questions to columns

Each question gives one or more columns, all sharing the question label,
the description (directive) and the question group.

### Sub-questions (grids)

When a question has sub-questions, it must have exactly one response and
that response cannot have a contingent question. Each sub-question becomes
a column named after the sub-question, labelled with the sub-question text,
with the choices of the response. The type is the declared format of the
response, or `array`.

### Plain responses

Otherwise every response becomes a column named after the response. The
label is the `<label>` of a free response, or the question text. The type is:

| declared format | categories | type |
|---|---|---|
| yes | any | the format |
| no | more than one | `single_choice` |
| no | exactly one | `multiple_choice` |
| no | none | `longtext` |

A single category means the response is one flag of a multiple-choice
question: LimeSurvey exports one response per option in that case.

### Contingent questions

A category may carry a follow-up question ("Other, please specify"). At most
one such question is allowed per response. It becomes a column placed right
after its parent, labelled `<parent label> / <contingent text>`, or
`<parent label> / <category label>` when it has no text. Its type is its
declared format, or `longtext`. The columns `contingent_of_name` and
`contingent_of_choice` point back to the parent column and the triggering
category code.

### Question groups

With a single response, the group is the response name. With several
responses, it is the longest common prefix of their names, cut at the first
underscore: `Q5_SQ001`, `Q5_SQ002` and `Q5_other` make the group `Q5`.

## Errors

Any violation of the rules above rejects the whole document, see
[`crate::StructureError`]. Two situations are only warnings (logged with the
`log` crate): questions with several `<text>` blocks or several
`<directive>` blocks. The first one is used.

## The `quexml` command

```bash
quexml -i survey.xml                         # JSON on stdout
quexml -i survey.xml --output-type csv -o columns.csv
quexml -i survey.xml --output-type sections-csv
quexml -i survey.xml -r expected.json        # fails if the output differs
```

Pass `--verbose` to see the details of the parsing.
*/
